//! Runtime configuration, read from the environment (and `.env` via dotenvy).

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_CLASSIFICATION_MAX_RESULTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Full URL of the `analyzeImage` action.
    pub endpoint: String,
    pub api_key: String,
    pub compartment_id: String,
    pub classification_max_results: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub vision: VisionConfig,
    pub bind_addr: String,
    /// TTF/OTF used for on-image labels; outlines only when unset.
    pub font_path: Option<PathBuf>,
}

impl Config {
    /// Call after `dotenvy::dotenv()` so `.env` values are visible.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{} must be set in the environment or .env file", name))
        };

        let classification_max_results = match lookup("CLASSIFICATION_MAX_RESULTS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("CLASSIFICATION_MAX_RESULTS is not a number: {}", raw))?,
            None => DEFAULT_CLASSIFICATION_MAX_RESULTS,
        };

        Ok(Config {
            vision: VisionConfig {
                endpoint: required("VISION_ENDPOINT")?,
                api_key: required("VISION_API_KEY")?,
                compartment_id: required("VISION_COMPARTMENT_ID")?,
                classification_max_results,
            },
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            font_path: lookup("ANNOTATION_FONT").map(PathBuf::from),
        })
    }
}
