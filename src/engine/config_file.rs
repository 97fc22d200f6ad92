use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::model::AnalysisType;

/// Per-analysis overrides.
#[derive(Default, Serialize, Deserialize, Debug, Clone)]
pub struct AnalysisSection {
    pub temperature: Option<f32>,
    /// Replaces the built-in system instruction verbatim.
    pub system_instruction: Option<String>,
    /// Handlebars prompt template used instead of the built-in one.
    pub template: Option<PathBuf>,
}

/// Represents the structure of the `nucleo.toml` file.
/// All fields are optional, so users only need to specify what they want to override.
#[derive(Default, Serialize, Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub model: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub business: AnalysisSection,
    #[serde(default)]
    pub personal: AnalysisSection,
}

impl ConfigFile {
    pub fn section(&self, kind: AnalysisType) -> &AnalysisSection {
        match kind {
            AnalysisType::Business => &self.business,
            AnalysisType::Personal => &self.personal,
        }
    }
}
