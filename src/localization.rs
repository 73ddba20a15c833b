//! UI string localization backed by batch machine translation.
//!
//! `resolve` is a total function: it always hands back some string, preferring
//! the machine-translated batch, then the bundled static table for the active
//! language, then the English source, then the key itself.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::cache::{Cache, ContentKey};
use crate::error::ASError;
use crate::flows::translate::{self, TranslateArgs, Translator};
use crate::flows::ContentTopic;
use crate::resolver::{ContentResolver, Origin};
use crate::Result;

/// Languages offered on the language selection screen.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("kn", "ಕನ್ನಡ"),
    ("hi", "हिन्दी"),
    ("en", "English"),
    ("ta", "தமிழ்"),
    ("te", "తెలుగు"),
    ("ml", "മലയാളം"),
    ("bn", "বাংলা"),
    ("gu", "ગુજરાતી"),
    ("pa", "ਪੰਜਾਬੀ"),
    ("mr", "मराठी"),
];

// English source strings. The batch translation request joins the values in
// this exact order, so the table is an ordered slice rather than a map.
const EN: &[(&str, &str)] = &[
    ("welcomeToAgriSaarathi", "Welcome to AgriSaarathi"),
    ("welcomeFarmer", "Welcome, Farmer"),
    ("aiAssistantForFarming", "Your AI assistant for smart farming"),
    ("selectLanguageTitle", "Select your language"),
    (
        "selectLanguageDescription",
        "Choose the language you are most comfortable with",
    ),
    ("selectYourCropsTitle", "Select your crops"),
    (
        "selectYourCropsDescription",
        "Pick the crops you grow to personalize your dashboard",
    ),
    ("selectTopicsTitle", "Select topics"),
    (
        "selectTopicsDescription",
        "Choose the topics you want updates about",
    ),
    ("continueButton", "Continue"),
    ("nextButton", "Next"),
    ("featureDashboard", "Dashboard"),
    ("featureMarket", "Market Trends"),
    ("featureGuidance", "Plantation Guidance"),
    ("featureScan", "Scan Plant"),
    ("featureSubsidy", "Subsidies"),
    ("analysisResult", "Analysis Result"),
    ("analysisFailed", "Analysis failed. Please try again."),
    ("couldNotFetchCrops", "Could not fetch crops"),
    ("showingDefaultCrops", "Showing default crops instead"),
    ("failedToLoadTopics", "Failed to load topics"),
];

const HI: &[(&str, &str)] = &[
    ("welcomeToAgriSaarathi", "एग्रीसारथी में आपका स्वागत है"),
    ("welcomeFarmer", "स्वागत है, किसान"),
    ("aiAssistantForFarming", "स्मार्ट खेती के लिए आपका AI सहायक"),
    ("selectLanguageTitle", "अपनी भाषा चुनें"),
    ("selectYourCropsTitle", "अपनी फसलें चुनें"),
    ("continueButton", "जारी रखें"),
    ("nextButton", "आगे"),
    ("featureMarket", "बाज़ार भाव"),
    ("featureGuidance", "रोपण मार्गदर्शन"),
    ("featureSubsidy", "सब्सिडी"),
    ("analysisFailed", "विश्लेषण विफल रहा। कृपया पुनः प्रयास करें।"),
];

const TA: &[(&str, &str)] = &[
    ("welcomeToAgriSaarathi", "அக்ரிசாரதிக்கு வரவேற்கிறோம்"),
    ("welcomeFarmer", "வணக்கம், விவசாயி"),
    ("selectLanguageTitle", "உங்கள் மொழியைத் தேர்ந்தெடுக்கவும்"),
    ("selectYourCropsTitle", "உங்கள் பயிர்களைத் தேர்ந்தெடுக்கவும்"),
    ("continueButton", "தொடரவும்"),
    ("nextButton", "அடுத்து"),
    ("featureMarket", "சந்தை நிலவரம்"),
    ("featureSubsidy", "மானியங்கள்"),
    ("analysisFailed", "பகுப்பாய்வு தோல்வியடைந்தது. மீண்டும் முயற்சிக்கவும்."),
];

lazy_static! {
    static ref STATIC_TABLES: HashMap<&'static str, HashMap<&'static str, &'static str>> = {
        let mut tables = HashMap::new();
        tables.insert("en", EN.iter().copied().collect());
        tables.insert("hi", HI.iter().copied().collect());
        tables.insert("ta", TA.iter().copied().collect());
        tables
    };
}

fn static_table(code: &str) -> HashMap<String, String> {
    STATIC_TABLES
        .get(code)
        .map(|table| {
            table
                .iter()
                .map(|(key, text)| (key.to_string(), text.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn english_source(key: &str) -> Option<&'static str> {
    EN.iter()
        .find(|(en_key, _)| *en_key == key)
        .map(|(_, text)| *text)
}

fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(lang, _)| *lang == code)
}

fn translations_key(code: &str) -> ContentKey {
    ContentKey::new(&format!("translations_{}", code), ContentTopic::Translation)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TranslationState {
    /// English source strings, nothing translated.
    Idle,
    /// A batch translation is in flight for the selected language.
    Translating,
    /// A translated batch is active, served from the cache or a fresh fetch.
    Ready,
    /// Translation failed; the bundled static table is active.
    Failed,
}

pub struct LocalizationResolver<T, C> {
    translator: T,
    resolver: ContentResolver<C>,
    language: RefCell<String>,
    state: RefCell<TranslationState>,
    dynamic: RefCell<HashMap<String, String>>,
}

impl<T: Translator, C: Cache<ContentKey>> LocalizationResolver<T, C> {
    pub fn new(translator: T, resolver: ContentResolver<C>) -> Self {
        LocalizationResolver {
            translator,
            resolver,
            language: RefCell::new("en".to_string()),
            state: RefCell::new(TranslationState::Idle),
            dynamic: RefCell::new(HashMap::new()),
        }
    }

    pub fn language(&self) -> String {
        self.language.borrow().clone()
    }

    pub fn state(&self) -> TranslationState {
        *self.state.borrow()
    }

    /// Switch the active language. A cached batch is reused without a network
    /// call; otherwise the whole English table is machine translated in one
    /// request. On failure the bundled static table takes over.
    pub fn set_language(&self, code: &str) -> Result<()> {
        if !is_supported(code) {
            return Err(
                ASError::ValidationError(format!("Unsupported language code: {}", code)).into(),
            );
        }
        *self.language.borrow_mut() = code.to_string();
        if code == "en" {
            self.dynamic.borrow_mut().clear();
            *self.state.borrow_mut() = TranslationState::Idle;
            return Ok(());
        }
        *self.state.borrow_mut() = TranslationState::Translating;
        let resolved = self.resolver.resolve(
            &translations_key(code),
            || self.translate_batch(code),
            static_table(code),
        );
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(err) => {
                *self.state.borrow_mut() = TranslationState::Failed;
                return Err(err);
            }
        };
        *self.state.borrow_mut() = match resolved.origin {
            Origin::StaticDefault => TranslationState::Failed,
            _ => TranslationState::Ready,
        };
        *self.dynamic.borrow_mut() = resolved.value;
        Ok(())
    }

    fn translate_batch(&self, code: &str) -> Result<HashMap<String, String>> {
        let texts: Vec<&str> = EN.iter().map(|(_, text)| *text).collect();
        let combined = translate::join_batch(&texts);
        let args = TranslateArgs {
            text: combined,
            target_language: code.to_string(),
        };
        let translation = self.translator.translate(&args)?;
        let segments = translate::split_batch(&translation.translated_text, EN.len())?;
        let fallback = static_table(code);
        let mut table = HashMap::new();
        for ((key, source), segment) in EN.iter().zip(segments) {
            // Per-key fallback when translation returned an empty segment.
            let text = if segment.is_empty() {
                fallback
                    .get(*key)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| source.to_string())
            } else {
                segment
            };
            table.insert(key.to_string(), text);
        }
        Ok(table)
    }

    /// Drop the cached batch for a language. If it is the active language the
    /// resolver reverts to English until the next `set_language`.
    pub fn invalidate(&self, code: &str) -> Result<()> {
        if !is_supported(code) {
            return Err(
                ASError::ValidationError(format!("Unsupported language code: {}", code)).into(),
            );
        }
        self.resolver.invalidate(&translations_key(code))?;
        if *self.language.borrow() == code {
            self.dynamic.borrow_mut().clear();
            *self.state.borrow_mut() = TranslationState::Idle;
        }
        Ok(())
    }

    /// Total function for UI rendering: never fails outward.
    pub fn resolve(&self, key: &str) -> String {
        if let Some(text) = self.dynamic.borrow().get(key) {
            return text.clone();
        }
        let language = self.language.borrow();
        if let Some(table) = STATIC_TABLES.get(language.as_str()) {
            if let Some(text) = table.get(key) {
                return text.to_string();
            }
        }
        english_source(key)
            .map(|text| text.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
