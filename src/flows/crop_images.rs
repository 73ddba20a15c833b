//! Iconic per-crop images for list and card views.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api_defaults::PLACEHOLDER_IMAGE_URL;
use crate::cache::{Cache, ContentKey};
use crate::error::ASError;
use crate::fetcher::{Flow, RemoteContentFetcher};
use crate::flows::{is_media_uri, ContentTopic};
use crate::io::{HttpResponse, HttpRunner};
use crate::resolver::{ContentResolver, ResolvedContent};
use crate::schema::{FieldType, Schema};
use crate::Result;

/// One self-describing media payload per generation. Callers treat the URI
/// as opaque: it can be an inline data URI or a hosted URL.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    pub image_url: String,
}

fn flow() -> Flow {
    Flow::new(
        "crop-image",
        Schema::new().required("imageUrl", FieldType::String),
    )
}

pub fn fallback_image() -> MediaPayload {
    MediaPayload {
        image_url: PLACEHOLDER_IMAGE_URL.to_string(),
    }
}

pub fn generate<R, C>(
    fetcher: &RemoteContentFetcher<R>,
    resolver: &ContentResolver<C>,
    crop_name: &str,
) -> Result<ResolvedContent<MediaPayload>>
where
    R: HttpRunner<Response = HttpResponse>,
    C: Cache<ContentKey>,
{
    if crop_name.trim().is_empty() {
        return Err(ASError::ValidationError("Crop name cannot be empty".to_string()).into());
    }
    let flow = flow();
    let key = ContentKey::new(&format!("image_{}", crop_name), ContentTopic::CropImages);
    resolver.resolve(
        &key,
        || {
            let payload = fetcher.fetch(&flow, &json!({ "cropName": crop_name }))?;
            let media: MediaPayload = serde_json::from_value(payload)
                .map_err(|err| ASError::SchemaViolation(format!("{}: {}", flow.name(), err)))?;
            if !is_media_uri(&media.image_url) {
                return Err(ASError::SchemaViolation(format!(
                    "{}: imageUrl is not a media payload",
                    flow.name()
                ))
                .into());
            }
            Ok(media)
        },
        fallback_image(),
    )
}
