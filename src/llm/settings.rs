use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the LLM API key
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4.1";
pub const DEFAULT_INDICATOR_MODEL: &str = "gpt-4-0613";
const DEFAULT_TIMEOUT: &str = "60s";
const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_CONCURRENCY: usize = 4;

/// `llm:` section of the config file. The API key never lives here.
///
/// Example YAML:
/// ```yaml
/// llm:
///   text_model: gpt-4o-mini
///   timeout: 45s
///   concurrency: 2
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub text_model: Option<String>,
    /// Image-capable model for photo exhibits
    #[serde(default)]
    pub vision_model: Option<String>,
    /// Model for litigation indicators from claim notes
    #[serde(default)]
    pub indicator_model: Option<String>,
    /// Per-request timeout, humantime format ("30s", "2m")
    #[serde(default)]
    pub timeout: Option<String>,
    /// Attempts for transient failures (network, 429, 5xx)
    #[serde(default)]
    pub max_retries: Option<usize>,
    /// Exhibits processed at once
    #[serde(default)]
    pub concurrency: Option<usize>,
}

/// Everything an LLM client needs, built explicitly and handed to it.
#[derive(Clone, PartialEq)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub indicator_model: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub concurrency: usize,
}

// Keep the key out of debug logs
impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &format_args!("<{} chars>", self.api_key.len()))
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("vision_model", &self.vision_model)
            .field("indicator_model", &self.indicator_model)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl LlmSettings {
    pub fn from_config(config: &LlmConfig, api_key: String) -> Result<Self> {
        let timeout_str = config.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        let timeout = humantime::parse_duration(timeout_str)
            .with_context(|| format!("llm.timeout: invalid duration '{}'", timeout_str))?;

        Ok(Self {
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            text_model: config
                .text_model
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            vision_model: config
                .vision_model
                .clone()
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            indicator_model: config
                .indicator_model
                .clone()
                .unwrap_or_else(|| DEFAULT_INDICATOR_MODEL.to_string()),
            timeout,
            max_retries: config.max_retries.unwrap_or(DEFAULT_MAX_RETRIES).max(1),
            concurrency: config.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
        })
    }

    /// Chat Completions endpoint under the configured base URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Read the API key from the environment. Blank values count as missing.
pub fn api_key_from_env() -> Option<String> {
    match std::env::var(ENV_API_KEY) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}
