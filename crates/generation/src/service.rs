use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling parameters sent with every generation request.
/// （每次產生請求所附帶的取樣參數。）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl SamplingConfig {
    /// Low-randomness policy used for code output. Not user-tunable.
    pub const POLICY: SamplingConfig = SamplingConfig {
        temperature: 0.2,
        top_p: 0.95,
        top_k: 64,
        max_output_tokens: 8192,
    };
}

/// Failure reported by a generation backend.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing API key (set {0})")]
    MissingApiKey(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Boundary to an external text-generation service.
/// （外部文字產生服務的介面。）
pub trait GenerationService {
    fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<String, ServiceError>;
}

impl<S: GenerationService + ?Sized> GenerationService for &S {
    fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<String, ServiceError> {
        (**self).generate_content(model, prompt, config)
    }
}

impl<S: GenerationService + ?Sized> GenerationService for Box<S> {
    fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<String, ServiceError> {
        (**self).generate_content(model, prompt, config)
    }
}
