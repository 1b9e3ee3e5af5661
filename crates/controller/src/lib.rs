//! Top-level application state and its transitions.
//! （應用程式頂層狀態與狀態轉換。）
//!
//! Hosts forward UI events to [`AppController`] and render from
//! [`AppController::state`] and [`AppController::preview`]. Long-running work
//! (the generation call, the run settle delay) is split into a request
//! transition and a completion transition so a host can perform it on its own
//! schedule while the busy flags keep duplicate triggers out.

use std::time::Duration;

use codegenius_catalog::{LanguageId, DEFAULT_LANGUAGE, SUGGESTIONS};
use codegenius_generation::{CodeGenerator, GenerationError, GenerationService};
use codegenius_preview::{BlobStore, PreviewEngine, PreviewError, ResourceStore, RunTicket};
use thiserror::Error;
use tracing::{info, warn};

/// Message shown when generation fails.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate code. Please check your API key and try again.";

/// Rejected transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("a generation request is already in flight")]
    GenerationInFlight,
    #[error("there is no code to run")]
    NothingToRun,
    #[error(transparent)]
    Preview(#[from] PreviewError),
}

/// Values owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub language: LanguageId,
    pub prompt: String,
    pub code: String,
    pub generating: bool,
    pub error: Option<String>,
}

impl AppState {
    pub fn new(language: LanguageId) -> Self {
        Self {
            language,
            prompt: String::new(),
            code: String::new(),
            generating: false,
            error: None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.generating {
            "Creating Code..."
        } else {
            "Ready"
        }
    }

    pub fn prompt_placeholder(&self) -> String {
        format!("Describe the {} code you want to generate...", self.language)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

/// A generation call the host must perform and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub id: u64,
    pub language: LanguageId,
    pub prompt: String,
}

/// Coordinates state, generation and the preview engine.
#[derive(Debug)]
pub struct AppController<S: ResourceStore = BlobStore> {
    state: AppState,
    preview: PreviewEngine<S>,
    next_request: u64,
    in_flight: Option<u64>,
}

impl AppController<BlobStore> {
    pub fn new(language: LanguageId, settle_delay: Duration) -> Self {
        Self::with_preview(
            PreviewEngine::new(language).with_settle_delay(settle_delay),
        )
    }
}

impl<S: ResourceStore> AppController<S> {
    pub fn with_preview(preview: PreviewEngine<S>) -> Self {
        Self {
            state: AppState::new(preview.language()),
            preview,
            next_request: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn preview(&self) -> &PreviewEngine<S> {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewEngine<S> {
        &mut self.preview
    }

    pub fn can_generate(&self) -> bool {
        !self.state.generating && !self.state.prompt.trim().is_empty()
    }

    pub fn can_run(&self) -> bool {
        !self.preview.is_running() && !self.state.code.is_empty()
    }

    pub fn select_language(&mut self, language: LanguageId) {
        self.state.language = language;
        self.preview.set_language(language);
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.prompt = prompt.into();
    }

    /// Copies a canned suggestion into the prompt. Returns `false` for an
    /// unknown index.
    pub fn apply_suggestion(&mut self, index: usize) -> bool {
        match SUGGESTIONS.get(index) {
            Some(suggestion) => {
                self.state.prompt = (*suggestion).to_string();
                true
            }
            None => false,
        }
    }

    pub fn edit_code(&mut self, code: impl Into<String>) {
        self.state.code = code.into();
    }

    /// Clears prompt and code.
    pub fn reset(&mut self) {
        self.state.prompt.clear();
        self.state.code.clear();
    }

    /// Starts a generation. The prompt must be non-empty after trimming and
    /// no other request may be pending.
    pub fn request_generation(&mut self) -> Result<GenerationRequest, ControllerError> {
        if self.state.prompt.trim().is_empty() {
            return Err(ControllerError::EmptyPrompt);
        }
        if self.state.generating {
            return Err(ControllerError::GenerationInFlight);
        }
        self.next_request += 1;
        let id = self.next_request;
        self.in_flight = Some(id);
        self.state.generating = true;
        self.state.error = None;
        info!(request = id, language = %self.state.language, "generation requested");
        Ok(GenerationRequest {
            id,
            language: self.state.language,
            prompt: self.state.prompt.clone(),
        })
    }

    /// Records the outcome of request `id`. Returns `false` when `id` is not
    /// the pending request.
    pub fn finish_generation(
        &mut self,
        id: u64,
        outcome: Result<String, GenerationError>,
    ) -> bool {
        if self.in_flight != Some(id) {
            warn!(request = id, "ignoring result for unknown generation request");
            return false;
        }
        self.in_flight = None;
        self.state.generating = false;
        match outcome {
            Ok(code) => {
                self.state.code = code;
                self.state.error = None;
            }
            Err(err) => {
                warn!(request = id, "generation failed: {err}");
                self.state.error = Some(GENERATION_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Runs a whole generation synchronously through `generator`.
    pub fn generate_with<G: GenerationService>(
        &mut self,
        generator: &CodeGenerator<G>,
    ) -> Result<(), ControllerError> {
        let request = self.request_generation()?;
        let outcome = generator.generate(request.language, &request.prompt);
        self.finish_generation(request.id, outcome);
        Ok(())
    }

    /// Starts a preview run over the current code buffer.
    pub fn request_run(&mut self) -> Result<RunTicket, ControllerError> {
        if self.state.code.is_empty() {
            return Err(ControllerError::NothingToRun);
        }
        Ok(self.preview.begin_run(&self.state.code)?)
    }

    pub fn complete_run(&mut self, ticket: RunTicket) -> Result<(), ControllerError> {
        self.preview.complete_run(ticket)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> AppController {
        AppController::new(LanguageId::Html, Duration::ZERO)
    }

    #[test]
    fn status_label_tracks_generation() {
        let mut app = controller();
        assert_eq!(app.state().status_label(), "Ready");
        app.set_prompt("navbar");
        let request = app.request_generation().unwrap();
        assert_eq!(app.state().status_label(), "Creating Code...");
        assert!(!app.can_generate());
        app.finish_generation(request.id, Ok("<nav></nav>".into()));
        assert_eq!(app.state().status_label(), "Ready");
    }

    #[test]
    fn suggestions_fill_the_prompt() {
        let mut app = controller();
        assert!(app.apply_suggestion(1));
        assert_eq!(
            app.state().prompt,
            "Generate a Python function to calculate Fibonacci"
        );
        assert!(!app.apply_suggestion(SUGGESTIONS.len()));
    }

    #[test]
    fn unknown_request_ids_are_ignored() {
        let mut app = controller();
        app.set_prompt("x");
        let request = app.request_generation().unwrap();
        assert!(!app.finish_generation(request.id + 1, Ok("nope".into())));
        assert!(app.state().generating);
        assert!(app.finish_generation(request.id, Ok("yes".into())));
        assert!(!app.finish_generation(request.id, Ok("again".into())));
        assert_eq!(app.state().code, "yes");
    }

    #[test]
    fn placeholder_names_the_language() {
        let mut app = controller();
        app.select_language(LanguageId::Kotlin);
        assert_eq!(
            app.state().prompt_placeholder(),
            "Describe the Kotlin code you want to generate..."
        );
    }
}
