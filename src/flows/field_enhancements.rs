//! Banner image and value-added product suggestions for a field's crop.

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

#[derive(Builder, Clone, Debug)]
pub struct FieldEnhancementsArgs {
    pub crop_name: String,
}

impl FieldEnhancementsArgs {
    pub fn builder() -> FieldEnhancementsArgsBuilder {
        FieldEnhancementsArgsBuilder::default()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueAddedProduct {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldEnhancements {
    /// Self-describing media payload: a data URI or a fetchable URL.
    pub banner_image_url: String,
    pub value_added_products: Vec<ValueAddedProduct>,
}

fn flow() -> Flow {
    let product = Schema::new()
        .required("name", FieldType::String)
        .required("description", FieldType::String);
    Flow::new(
        "field-enhancements",
        Schema::new()
            .required("bannerImageUrl", FieldType::String)
            .required(
                "valueAddedProducts",
                FieldType::Array(Box::new(FieldType::Object(product))),
            ),
    )
}

fn validate(args: &FieldEnhancementsArgs) -> Result<()> {
    if args.crop_name.trim().is_empty() {
        return Err(ASError::ValidationError("Crop name cannot be empty".to_string()).into());
    }
    Ok(())
}

pub fn fallback_enhancements() -> FieldEnhancements {
    FieldEnhancements {
        banner_image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        value_added_products: Vec::new(),
    }
}

pub fn enhancements<R, C>(
    fetcher: &RemoteContentFetcher<R>,
    resolver: &ContentResolver<C>,
    args: &FieldEnhancementsArgs,
) -> Result<ResolvedContent<FieldEnhancements>>
where
    R: HttpRunner<Response = HttpResponse>,
    C: Cache<ContentKey>,
{
    validate(args)?;
    let flow = flow();
    let key = ContentKey::new(
        &format!("enhancements_{}", args.crop_name),
        ContentTopic::FieldEnhancements,
    );
    resolver.resolve(
        &key,
        || {
            let payload = fetcher.fetch(&flow, &json!({ "cropName": args.crop_name }))?;
            let enhancements: FieldEnhancements = serde_json::from_value(payload)
                .map_err(|err| ASError::SchemaViolation(format!("{}: {}", flow.name(), err)))?;
            if !is_media_uri(&enhancements.banner_image_url) {
                return Err(ASError::SchemaViolation(format!(
                    "{}: bannerImageUrl is not a media payload",
                    flow.name()
                ))
                .into());
            }
            if enhancements.value_added_products.is_empty() {
                return Err(ASError::SchemaViolation(format!(
                    "{}: no value-added products returned",
                    flow.name()
                ))
                .into());
            }
            Ok(enhancements)
        },
        fallback_enhancements(),
    )
}
