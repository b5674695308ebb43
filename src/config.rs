//! Configuration loading and validation.
//!
//! Settings live in a `config.json` next to the binary (see
//! `config.json.template`). The file is read **once** per run and the
//! resulting [`Config`] is an immutable value passed into the batch; nothing
//! re-reads it mid-run, so a batch can never observe configuration drift.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// Value a freshly copied template still contains.
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Hard cap on concurrent remote calls, regardless of configuration.
pub const MAX_WORKERS_CAP: usize = 8;

fn default_base_url() -> String {
    "https://ark.cn-beijing.volces.com/api/v3".to_string()
}

fn default_prompt() -> String {
    "请对比分析这两张图片，总结它们之间的核心差异和共同点。".to_string()
}

fn default_max_workers() -> usize {
    5
}

fn default_input_price() -> f64 {
    0.0030
}

fn default_output_price() -> f64 {
    0.0090
}

/// Run configuration, loaded once and passed by value.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API credential for the Ark endpoint.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the OpenAI-compatible chat API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Inference endpoint / model identifier.
    #[serde(default)]
    pub model_id: Option<String>,
    /// Prompt sent ahead of the two images.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Maximum concurrent remote calls, clamped to 1..=MAX_WORKERS_CAP.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Currency per 1000 prompt tokens.
    #[serde(default = "default_input_price")]
    pub input_price_per_1k_tokens: f64,
    /// Currency per 1000 completion tokens.
    #[serde(default = "default_output_price")]
    pub output_price_per_1k_tokens: f64,
}

impl Config {
    /// Load and validate configuration from a JSON file.
    ///
    /// Validation is a hard precondition: a missing file, malformed JSON,
    /// or a missing/placeholder credential fails before any pair is touched.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "cannot read {} ({e}); copy config.json.template to {} and fill it in",
                path.display(),
                path.display()
            ))
        })?;

        let mut config: Config = serde_json::from_str(&contents)
            .map_err(|e| Error::Configuration(format!("{} is not valid: {e}", path.display())))?;

        config.validate()?;
        config.max_workers = config.max_workers.clamp(1, MAX_WORKERS_CAP);
        // The template ships `"model_id": ""`; an empty ID is no model at all.
        if config.model_id.as_deref().is_some_and(|m| m.is_empty()) {
            config.model_id = None;
        }
        tracing::debug!(
            base_url = %config.base_url,
            max_workers = config.max_workers,
            "loaded configuration from {}",
            path.display()
        );
        Ok(config)
    }

    /// Check the credential precondition.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(Error::Configuration(
                "api_key is missing or still set to the template placeholder".to_string(),
            ));
        }
        Ok(())
    }
}
