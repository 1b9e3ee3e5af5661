//! Gemini `generateContent` REST adapter.
//! （Gemini `generateContent` REST 介面的轉接器。）

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::service::{GenerationService, SamplingConfig, ServiceError};

/// Public Generative Language API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for coding tasks unless configured otherwise.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

const API_KEY_HEADER: &str = "x-goog-api-key";

const USER_AGENT_VALUE: &str = concat!("codegenius/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    api_key_source: String,
}

impl GeminiService {
    /// Creates a client. `api_key_source` names where the key should come from
    /// and is only used in error messages.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        api_key_source: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        // No request timeout: a stalled call keeps the caller busy until it resolves.
        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| ServiceError::Transport(format!("failed to create HTTP client: {err}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_source: api_key_source.into(),
        })
    }

    /// Reads the API key from the first populated environment variable.
    pub fn from_env(endpoint: impl Into<String>, vars: &[&str]) -> Result<Self, ServiceError> {
        let key = vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());
        Self::new(endpoint, key, vars.join(" or "))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.endpoint)
    }
}

impl GenerationService for GeminiService {
    fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<String, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::MissingApiKey(self.api_key_source.clone()))?;

        let url = self.url(model);
        debug!(%url, "POST generateContent");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request_body(prompt, config))
            .send()
            .map_err(|err| ServiceError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "generateContent rejected");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|err| ServiceError::Malformed(err.to_string()))?;
        extract_text(parsed)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: SamplingConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<OutgoingPart<'a>>,
}

#[derive(Debug, Serialize)]
struct OutgoingPart<'a> {
    text: &'a str,
}

fn request_body<'a>(prompt: &'a str, config: &SamplingConfig) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![OutgoingPart { text: prompt }],
        }],
        generation_config: *config,
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<IncomingPart>,
}

#[derive(Debug, Deserialize)]
struct IncomingPart {
    text: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ServiceError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .ok_or_else(|| ServiceError::Malformed("response has no candidates".into()))?;
    Ok(content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect())
}
