use codegenius_catalog::LanguageId;
use thiserror::Error;
use tracing::{debug, error};

use crate::normalize::normalize_response;
use crate::prompt::build_prompt;
use crate::service::{GenerationService, SamplingConfig};

/// Errors surfaced to callers of [`CodeGenerator::generate`].
/// （呼叫端可見的產生錯誤。）
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to generate code. Please try again.")]
    GenerationFailed,
}

/// Sends a language + prompt to a [`GenerationService`] and returns clean code.
/// （將語言與描述送至產生服務並取回整理後的程式碼。）
///
/// The caller guarantees a non-empty prompt. No retries are attempted and no
/// state is kept between calls.
#[derive(Debug, Clone)]
pub struct CodeGenerator<S> {
    service: S,
    model: String,
}

impl<S: GenerationService> CodeGenerator<S> {
    pub fn new(service: S, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn generate(&self, language: LanguageId, prompt: &str) -> Result<String, GenerationError> {
        let instruction = build_prompt(language, prompt);
        debug!(%language, model = %self.model, "requesting code generation");
        let raw = self
            .service
            .generate_content(&self.model, &instruction, &SamplingConfig::POLICY)
            .map_err(|err| {
                error!(%language, "error generating code: {err}");
                GenerationError::GenerationFailed
            })?;
        Ok(normalize_response(&raw))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::service::ServiceError;

    struct ScriptedService {
        reply: Result<&'static str, &'static str>,
        calls: RefCell<Vec<(String, String, SamplingConfig)>>,
    }

    impl GenerationService for ScriptedService {
        fn generate_content(
            &self,
            model: &str,
            prompt: &str,
            config: &SamplingConfig,
        ) -> Result<String, ServiceError> {
            self.calls
                .borrow_mut()
                .push((model.to_string(), prompt.to_string(), *config));
            self.reply
                .map(str::to_string)
                .map_err(|msg| ServiceError::Transport(msg.to_string()))
        }
    }

    #[test]
    fn sends_policy_sampling_and_normalizes() {
        let service = ScriptedService {
            reply: Ok("```js\nconst a = 1;\n```"),
            calls: RefCell::new(Vec::new()),
        };
        let generator = CodeGenerator::new(&service, "test-model");
        let code = generator
            .generate(LanguageId::JavaScript, "declare a")
            .expect("generation should succeed");
        assert_eq!(code, "const a = 1;");

        let calls = service.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (model, prompt, config) = &calls[0];
        assert_eq!(model, "test-model");
        assert!(prompt.contains("JavaScript"));
        assert!(prompt.contains("declare a"));
        assert_eq!(*config, SamplingConfig::POLICY);
    }

    #[test]
    fn any_backend_failure_becomes_generation_failed() {
        let service = ScriptedService {
            reply: Err("quota exceeded"),
            calls: RefCell::new(Vec::new()),
        };
        let generator = CodeGenerator::new(&service, "m");
        let err = generator.generate(LanguageId::Sql, "select").unwrap_err();
        assert!(matches!(err, GenerationError::GenerationFailed));
        assert_eq!(service.calls.borrow().len(), 1, "no retry expected");
    }
}
