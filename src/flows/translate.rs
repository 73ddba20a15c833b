//! Text translation flow and the batch protocol used by the localization
//! layer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ASError;
use crate::fetcher::{Flow, RemoteContentFetcher};
use crate::io::{HttpResponse, HttpRunner};
use crate::schema::{FieldType, Schema};
use crate::Result;

/// All UI strings for one target language travel in a single request, joined
/// with this delimiter, to keep the per-call cost down. The response is split
/// on the same delimiter.
pub const BATCH_DELIMITER: &str = "|||";

#[derive(Builder, Clone, Debug)]
pub struct TranslateArgs {
    pub text: String,
    /// ISO-639-1 style code, e.g. "ta", "hi".
    pub target_language: String,
}

impl TranslateArgs {
    pub fn builder() -> TranslateArgsBuilder {
        TranslateArgsBuilder::default()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
}

/// Seam between the localization layer and the remote translation flow.
/// Implementors must return a typed failure, never an error-shaped success.
pub trait Translator {
    fn translate(&self, args: &TranslateArgs) -> Result<Translation>;
}

fn flow() -> Flow {
    Flow::new(
        "translate-text",
        Schema::new().required("translatedText", FieldType::String),
    )
}

fn validate(args: &TranslateArgs) -> Result<()> {
    lazy_static! {
        static ref RE_LANG_CODE: Regex = Regex::new(r"^[a-z]{2}$").unwrap();
    }
    if args.text.trim().is_empty() {
        return Err(ASError::ValidationError("No text to translate".to_string()).into());
    }
    if !RE_LANG_CODE.is_match(&args.target_language) {
        return Err(ASError::ValidationError(format!(
            "Invalid target language code: {}",
            args.target_language
        ))
        .into());
    }
    Ok(())
}

pub struct RemoteTranslator<R> {
    fetcher: RemoteContentFetcher<R>,
}

impl<R> RemoteTranslator<R> {
    pub fn new(fetcher: RemoteContentFetcher<R>) -> Self {
        RemoteTranslator { fetcher }
    }
}

impl<R: HttpRunner<Response = HttpResponse>> Translator for RemoteTranslator<R> {
    fn translate(&self, args: &TranslateArgs) -> Result<Translation> {
        validate(args)?;
        // English is the source language, nothing to do.
        if args.target_language == "en" {
            return Ok(Translation {
                translated_text: args.text.clone(),
            });
        }
        let inputs = json!({
            "text": args.text,
            "targetLanguage": args.target_language,
        });
        let payload = self.fetcher.fetch(&flow(), &inputs)?;
        let translation = serde_json::from_value(payload)
            .map_err(|err| ASError::SchemaViolation(format!("translate-text: {}", err)))?;
        Ok(translation)
    }
}

pub fn join_batch(texts: &[&str]) -> String {
    texts.join(BATCH_DELIMITER)
}

/// Splitting must yield exactly as many segments as were joined. Translation
/// occasionally eats or emits delimiter sequences; any count mismatch fails
/// closed instead of misaligning keys positionally.
pub fn split_batch(translated: &str, expected: usize) -> Result<Vec<String>> {
    let segments: Vec<String> = translated
        .split(BATCH_DELIMITER)
        .map(|segment| segment.trim().to_string())
        .collect();
    if segments.len() != expected {
        return Err(ASError::SchemaViolation(format!(
            "translation batch returned {} segments, expected {}",
            segments.len(),
            expected
        ))
        .into());
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{config, MockRunner};
    use std::sync::Arc;

    fn remote_translator(responses: Vec<HttpResponse>) -> (Arc<MockRunner<HttpResponse>>, RemoteTranslator<MockRunner<HttpResponse>>) {
        let runner = Arc::new(MockRunner::new(responses));
        let fetcher = RemoteContentFetcher::new(runner.clone(), config());
        (runner, RemoteTranslator::new(fetcher))
    }

    fn args(text: &str, lang: &str) -> TranslateArgs {
        TranslateArgs::builder()
            .text(text.to_string())
            .target_language(lang.to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_translate_returns_translated_text() {
        let response = HttpResponse::builder()
            .status(200)
            .body(r#"{"translatedText":"வணக்கம்"}"#.to_string())
            .build()
            .unwrap();
        let (runner, translator) = remote_translator(vec![response]);
        let translation = translator.translate(&args("hello", "ta")).unwrap();
        assert_eq!("வணக்கம்", translation.translated_text);
        assert_eq!("http://localhost/translate-text", *runner.url());
    }

    #[test]
    fn test_english_target_short_circuits_without_network() {
        let (runner, translator) = remote_translator(vec![]);
        let translation = translator.translate(&args("hello", "en")).unwrap();
        assert_eq!("hello", translation.translated_text);
        assert_eq!(0, *runner.run_count.borrow());
    }

    #[test]
    fn test_empty_text_is_validation_error() {
        let (_, translator) = remote_translator(vec![]);
        let err = translator.translate(&args("  ", "ta")).unwrap_err();
        match err.downcast_ref::<ASError>() {
            Some(ASError::ValidationError(_)) => {}
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_malformed_language_code_is_validation_error() {
        let (_, translator) = remote_translator(vec![]);
        for code in ["", "T", "tam", "ta-IN", "TA"] {
            let err = translator.translate(&args("hello", code)).unwrap_err();
            match err.downcast_ref::<ASError>() {
                Some(ASError::ValidationError(_)) => {}
                _ => panic!("Expected ValidationError for code {:?}", code),
            }
        }
    }

    #[test]
    fn test_join_then_split_preserves_cardinality() {
        let texts = vec!["Welcome", "Continue", "Select your crops"];
        let joined = join_batch(&texts);
        let segments = split_batch(&joined, texts.len()).unwrap();
        assert_eq!(vec!["Welcome", "Continue", "Select your crops"], segments);
    }

    #[test]
    fn test_split_trims_segments() {
        let segments = split_batch("one ||| two|||three ", 3).unwrap();
        assert_eq!(vec!["one", "two", "three"], segments);
    }

    #[test]
    fn test_short_batch_fails_closed() {
        let err = split_batch("one|||two", 3).unwrap_err();
        match err.downcast_ref::<ASError>() {
            Some(ASError::SchemaViolation(msg)) => {
                assert!(msg.contains("2 segments, expected 3"))
            }
            _ => panic!("Expected SchemaViolation"),
        }
    }

    #[test]
    fn test_delimiter_inside_a_segment_fails_closed() {
        // Translation altered punctuation and produced a delimiter inside the
        // second segment. The count no longer matches and must not be
        // positionally realigned.
        let err = split_batch("one|||t|||wo|||three", 3).unwrap_err();
        match err.downcast_ref::<ASError>() {
            Some(ASError::SchemaViolation(_)) => {}
            _ => panic!("Expected SchemaViolation"),
        }
    }
}
