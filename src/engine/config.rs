// src/engine/config.rs

use std::time::Duration;

use clap::ValueEnum;
use derive_builder::Builder;

use crate::engine::model::AnalysisType;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Checked when the configured variable is unset.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Everything needed to run one analysis against the model.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(name = "build_internal"))]
pub struct AnalysisConfig {
    pub kind: AnalysisType,

    #[builder(default = "DEFAULT_MODEL.to_string()")]
    pub model: String,

    #[builder(default = "0.1")]
    pub temperature: f32,

    pub system_instruction: String,

    #[builder(default)]
    pub api_key: Option<String>,

    /// Where the key was looked up, for error messages.
    #[builder(default = "DEFAULT_API_KEY_ENV.to_string()")]
    pub api_key_env: String,

    #[builder(default = "DEFAULT_ENDPOINT.to_string()")]
    pub endpoint: String,

    #[builder(default = "Duration::from_secs(DEFAULT_TIMEOUT_SECS)")]
    pub timeout: Duration,
}

impl AnalysisConfigBuilder {
    pub fn build(&self) -> Result<AnalysisConfig, AnalysisConfigBuilderError> {
        self.build_internal()
    }
}
