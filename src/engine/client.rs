//! Client for the generative-language API.
//!
//! The whole outbound surface is one call: model, system instruction,
//! temperature and prompt in, free text out.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::config::AnalysisConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no API key configured (set {0})")]
    MissingApiKey(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One generation request.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub system_instruction: &'a str,
    pub temperature: f32,
    pub prompt: &'a str,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(config: &'a AnalysisConfig, prompt: &'a str) -> Self {
        Self {
            model: &config.model,
            system_instruction: &config.system_instruction,
            temperature: config.temperature,
            prompt,
        }
    }
}

/// The seam between the application and whatever produces the analysis text.
pub trait AnalysisClient {
    /// Returns the generated text, or `None` when the model answered with nothing.
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<Option<String>, ClientError>;
}

// ──────────────────────────────────────────────────────────────
//  Wire format
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub fn build_payload(request: &GenerateRequest<'_>) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: request.system_instruction.to_string(),
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: request.prompt.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
        },
    }
}

/// Pulls the text out of a `generateContent` response body.
///
/// All text parts of the first candidate are concatenated; an answer with no
/// text at all (or only whitespace) is `None`.
pub fn extract_text(body: &str) -> Result<Option<String>, ClientError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    Ok((!text.trim().is_empty()).then_some(text))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

// ──────────────────────────────────────────────────────────────
//  Gemini over HTTP
// ──────────────────────────────────────────────────────────────

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ClientError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ClientError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(api_key, &config.endpoint, config.timeout)
    }
}

impl AnalysisClient for GeminiClient {
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<Option<String>, ClientError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, request.model);
        log::info!(
            "requesting analysis from {} (temperature {})",
            request.model,
            request.temperature
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_payload(request))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        extract_text(&body)
    }
}

/// Replays a fixed response text. Used by `--dry-run` and in tests.
pub struct CannedClient {
    text: Option<String>,
}

impl CannedClient {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text: (!text.trim().is_empty()).then_some(text),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

impl AnalysisClient for CannedClient {
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<Option<String>, ClientError> {
        log::info!("dry run: skipping call to {}", request.model);
        Ok(self.text.clone())
    }
}
