//! Step-by-step plantation guide for a crop variety.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::{Cache, ContentKey};
use crate::error::ASError;
use crate::fetcher::{Flow, RemoteContentFetcher};
use crate::flows::ContentTopic;
use crate::io::{HttpResponse, HttpRunner};
use crate::resolver::{ContentResolver, ResolvedContent};
use crate::schema::{FieldType, Schema};
use crate::Result;

#[derive(Builder, Clone, Debug)]
pub struct PlantationArgs {
    pub crop_name: String,
    pub crop_variety: String,
}

impl PlantationArgs {
    pub fn builder() -> PlantationArgsBuilder {
        PlantationArgsBuilder::default()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlantationStep {
    pub step_number: u32,
    pub title: String,
    pub description: String,
    /// Link to an instructional video search for this step.
    pub video_url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlantationGuide {
    pub plantation_steps: Vec<PlantationStep>,
}

fn flow() -> Flow {
    let step = Schema::new()
        .required("stepNumber", FieldType::Number)
        .required("title", FieldType::String)
        .required("description", FieldType::String)
        .required("videoUrl", FieldType::String);
    Flow::new(
        "plantation-advisor",
        Schema::new().required(
            "plantationSteps",
            FieldType::Array(Box::new(FieldType::Object(step))),
        ),
    )
}

fn validate(args: &PlantationArgs) -> Result<()> {
    if args.crop_name.trim().is_empty() || args.crop_variety.trim().is_empty() {
        return Err(ASError::ValidationError(
            "Both crop name and variety must be provided".to_string(),
        )
        .into());
    }
    Ok(())
}

fn video_search_url(query: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        query.replace(' ', "+")
    )
}

/// Generic five-step guide served when the advisor is unreachable and no
/// guide is cached for the variety.
pub fn fallback_guide(crop: &str) -> PlantationGuide {
    PlantationGuide {
        plantation_steps: vec![
            PlantationStep {
                step_number: 1,
                title: "Field Preparation".to_string(),
                description: format!(
                    "Clear the field of all previous crop residues, weeds, and stones. \
                     This ensures a clean slate for your new {} crop.",
                    crop
                ),
                video_url: video_search_url(&format!("field preparation for {}", crop)),
            },
            PlantationStep {
                step_number: 2,
                title: "Ploughing and Tilling".to_string(),
                description: "Plough the land 2-3 times to achieve a fine tilth. This improves \
                              soil aeration, water absorption, and root penetration."
                    .to_string(),
                video_url: video_search_url(&format!("ploughing for {}", crop)),
            },
            PlantationStep {
                step_number: 3,
                title: "Soil Fertilization".to_string(),
                description: "Incorporate well-decomposed farmyard manure or compost into the \
                              soil to enrich its organic matter and nutrient content."
                    .to_string(),
                video_url: video_search_url(&format!("soil fertilization for {}", crop)),
            },
            PlantationStep {
                step_number: 4,
                title: "Seed Sowing or Transplanting".to_string(),
                description: format!(
                    "Sow the {} seeds or transplant seedlings at the recommended spacing and \
                     depth. Ensure proper moisture in the soil during this stage.",
                    crop
                ),
                video_url: video_search_url(&format!("sowing {} seeds", crop)),
            },
            PlantationStep {
                step_number: 5,
                title: "Continuous Monitoring & Weeding".to_string(),
                description: "Regularly monitor the field for weeds, pests, and diseases. \
                              Perform weeding operations as necessary to prevent competition \
                              for nutrients and water."
                    .to_string(),
                video_url: video_search_url(&format!("weeding {}", crop)),
            },
        ],
    }
}

pub fn guide<R, C>(
    fetcher: &RemoteContentFetcher<R>,
    resolver: &ContentResolver<C>,
    args: &PlantationArgs,
) -> Result<ResolvedContent<PlantationGuide>>
where
    R: HttpRunner<Response = HttpResponse>,
    C: Cache<ContentKey>,
{
    validate(args)?;
    let flow = flow();
    let key = ContentKey::new(
        &format!("plantation_{}_{}", args.crop_name, args.crop_variety),
        ContentTopic::Plantation,
    );
    resolver.resolve(
        &key,
        || {
            let inputs = json!({
                "cropName": args.crop_name,
                "cropVariety": args.crop_variety,
            });
            let payload = fetcher.fetch(&flow, &inputs)?;
            let guide: PlantationGuide = serde_json::from_value(payload)
                .map_err(|err| ASError::SchemaViolation(format!("{}: {}", flow.name(), err)))?;
            if guide.plantation_steps.is_empty() {
                return Err(ASError::SchemaViolation(format!(
                    "{}: guide contains no steps",
                    flow.name()
                ))
                .into());
            }
            for step in &guide.plantation_steps {
                if !step.video_url.starts_with("http://") && !step.video_url.starts_with("https://")
                {
                    return Err(ASError::SchemaViolation(format!(
                        "{}: step {} video url is not a link",
                        flow.name(),
                        step.step_number
                    ))
                    .into());
                }
            }
            Ok(guide)
        },
        fallback_guide(&args.crop_name),
    )
}
