//! Natural-language to code generation against an external text model.
//! （透過外部文字模型將自然語言描述轉換為程式碼。）

mod client;
mod gemini;
mod normalize;
mod prompt;
mod service;

pub use client::{CodeGenerator, GenerationError};
pub use gemini::{GeminiService, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use normalize::normalize_response;
pub use prompt::build_prompt;
pub use service::{GenerationService, SamplingConfig, ServiceError};
