use std::fmt::{self, Display, Formatter};

use regex::Regex;

pub mod crop_images;
pub mod field_enhancements;
pub mod market_trends;
pub mod plantation;
pub mod translate;

/// Families of remote generated content. Each topic carries its own cache
/// expiration in the configuration (`cache_<topic>_expiration`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentTopic {
    MarketTrends,
    FieldEnhancements,
    Plantation,
    CropImages,
    Translation,
}

impl ContentTopic {
    pub fn as_str(&self) -> &str {
        match self {
            ContentTopic::MarketTrends => "market_trends",
            ContentTopic::FieldEnhancements => "field_enhancements",
            ContentTopic::Plantation => "plantation",
            ContentTopic::CropImages => "crop_images",
            ContentTopic::Translation => "translation",
        }
    }
}

impl Display for ContentTopic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Media endpoints return one self-describing payload, either an inline
/// base64 data URI or a fetchable URL. Callers treat it as opaque.
pub fn is_media_uri(uri: &str) -> bool {
    lazy_static! {
        static ref RE_MEDIA: Regex =
            Regex::new(r"^(data:image/[a-z0-9.+-]+;base64,|https?://)").unwrap();
    }
    RE_MEDIA.is_match(uri)
}
