//! Config file parsing and validation.

use crate::api_defaults::{
    DEFAULT_CONTENT_EXPIRATION, DEFAULT_SLOW_CONTENT_EXPIRATION, REQUEST_TIMEOUT_SECONDS,
};
use crate::error;
use crate::flows::ContentTopic;
use crate::time::Seconds;
use crate::Result;
use std::sync::Arc;
use std::{collections::HashMap, io::Read};

pub trait ConfigProperties {
    fn api_token(&self) -> &str;
    fn generator_endpoint(&self) -> &str;
    fn cache_location(&self) -> Option<&str> {
        None
    }
    fn get_content_expiration(&self, _topic: &ContentTopic) -> &str {
        DEFAULT_CONTENT_EXPIRATION
    }
    fn request_timeout(&self) -> Seconds {
        Seconds::new(REQUEST_TIMEOUT_SECONDS)
    }
}

impl<T: ConfigProperties + ?Sized> ConfigProperties for Arc<T> {
    fn api_token(&self) -> &str {
        self.as_ref().api_token()
    }

    fn generator_endpoint(&self) -> &str {
        self.as_ref().generator_endpoint()
    }

    fn cache_location(&self) -> Option<&str> {
        self.as_ref().cache_location()
    }

    fn get_content_expiration(&self, topic: &ContentTopic) -> &str {
        self.as_ref().get_content_expiration(topic)
    }

    fn request_timeout(&self) -> Seconds {
        self.as_ref().request_timeout()
    }
}

#[derive(Clone, Default)]
pub struct Config {
    api_token: String,
    generator_endpoint: String,
    cache_location: Option<String>,
    content_expirations: HashMap<ContentTopic, String>,
    request_timeout: Seconds,
}

impl Config {
    pub fn new<T: Read>(reader: T) -> Result<Self> {
        let properties = Config::parse(reader)?;
        let api_token = properties
            .get("api_token")
            .ok_or_else(|| error::gen("No api_token found in config"))?;
        let generator_endpoint = properties
            .get("generator_endpoint")
            .ok_or_else(|| error::gen("No generator_endpoint found in config"))?;
        let cache_location = properties.get("cache_location").map(|s| s.to_string());
        let content_expirations = Config::content_expirations(&properties);
        let request_timeout = match properties.get("request_timeout") {
            Some(timeout) => timeout.as_str().try_into()?,
            None => Seconds::new(REQUEST_TIMEOUT_SECONDS),
        };

        Ok(Config {
            api_token: api_token.to_string(),
            generator_endpoint: generator_endpoint.to_string(),
            cache_location,
            content_expirations,
            request_timeout,
        })
    }

    fn content_expirations(properties: &HashMap<String, String>) -> HashMap<ContentTopic, String> {
        let topics = [
            (ContentTopic::MarketTrends, DEFAULT_CONTENT_EXPIRATION),
            (ContentTopic::FieldEnhancements, DEFAULT_CONTENT_EXPIRATION),
            (ContentTopic::Plantation, DEFAULT_SLOW_CONTENT_EXPIRATION),
            (ContentTopic::CropImages, DEFAULT_SLOW_CONTENT_EXPIRATION),
            (ContentTopic::Translation, DEFAULT_SLOW_CONTENT_EXPIRATION),
        ];
        let mut content_expirations = HashMap::new();
        for (topic, default) in topics {
            let key = format!("cache_{}_expiration", topic);
            let expiration = properties
                .get(&key)
                .map(|s| s.to_string())
                .unwrap_or_else(|| default.to_string());
            content_expirations.insert(topic, expiration);
        }
        content_expirations
    }

    fn parse<T: Read>(mut reader: T) -> Result<HashMap<String, String>> {
        let mut config_data = String::new();
        reader.read_to_string(&mut config_data)?;
        let regex = regex::Regex::new(r"^(?P<key>\w+)=(?P<value>.*)").unwrap();
        let mut properties = HashMap::new();
        for line in config_data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // capture groups key and value from regex
            match regex.captures(line) {
                Some(captured_names) => {
                    let key = captured_names.name("key").unwrap().as_str();
                    let value = captured_names.name("value").unwrap().as_str();
                    properties.insert(key.to_string(), value.to_string());
                }
                None => {
                    continue;
                }
            }
        }
        if properties.is_empty() {
            return Err(error::gen("No config data found"));
        }
        Ok(properties)
    }
}

impl ConfigProperties for Config {
    fn api_token(&self) -> &str {
        &self.api_token
    }

    fn generator_endpoint(&self) -> &str {
        &self.generator_endpoint
    }

    fn cache_location(&self) -> Option<&str> {
        self.cache_location.as_deref()
    }

    fn get_content_expiration(&self, topic: &ContentTopic) -> &str {
        self.content_expirations
            .get(topic)
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_CONTENT_EXPIRATION)
    }

    fn request_timeout(&self) -> Seconds {
        self.request_timeout
    }
}
