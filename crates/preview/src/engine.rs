//! Run lifecycle and console relay.
//! （執行生命週期與主控台轉送。）
//!
//! A run goes through two steps. [`PreviewEngine::begin_run`] supersedes the
//! previous session (its resource is released and its console cleared) and
//! returns a [`RunTicket`] carrying the settle deadline. Once the host has
//! shown its busy state, [`PreviewEngine::complete_run`] builds the document
//! or transcript. Only one run may be settling at a time, and at most one
//! resource handle is alive at any moment.

use std::time::{Duration, Instant};

use codegenius_catalog::LanguageId;
use thiserror::Error;
use tracing::{debug, info};

use crate::console::ConsoleLine;
use crate::document::{synthesize_document, InjectionPoint};
use crate::mode::{select_mode, RenderMode};
use crate::relay::{RelayMessage, RelayOutcome};
use crate::resource::{BlobStore, ResourceHandle, ResourceStore, SandboxPolicy, SessionId};
use crate::simulate::simulated_transcript;

/// Settle delay used when none is configured.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(600);

/// Errors raised by run transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("a run is already in progress")]
    RunInProgress,
    #[error("run {0} was superseded")]
    StaleRun(SessionId),
}

/// Output view tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputTab {
    Output,
    Console,
}

impl OutputTab {
    /// Default tab after switching to `language`.
    pub fn default_for(language: LanguageId) -> Self {
        match select_mode(language) {
            RenderMode::WebDocument => OutputTab::Output,
            RenderMode::Simulated => OutputTab::Console,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputTab::Output => "Output",
            OutputTab::Console => "Console",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Settling,
    Ready,
}

/// One run of the engine.
#[derive(Debug)]
pub struct PreviewSession {
    id: SessionId,
    language: LanguageId,
    code: String,
    mode: RenderMode,
    state: SessionState,
    handle: Option<ResourceHandle>,
    injection: Option<InjectionPoint>,
    console: Vec<ConsoleLine>,
}

impl PreviewSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Code snapshot the run was built from.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn is_settling(&self) -> bool {
        self.state == SessionState::Settling
    }

    pub fn handle(&self) -> Option<&ResourceHandle> {
        self.handle.as_ref()
    }

    /// Where the instrumentation was placed, for web runs.
    pub fn injection(&self) -> Option<InjectionPoint> {
        self.injection
    }

    pub fn console(&self) -> &[ConsoleLine] {
        &self.console
    }
}

/// Proof that a run was started; redeem it with [`PreviewEngine::complete_run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    session: SessionId,
    ready_at: Instant,
}

impl RunTicket {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        now >= self.ready_at
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.ready_at.saturating_duration_since(now)
    }
}

/// Owns the preview session and its single resource slot.
/// （持有預覽執行階段與唯一的資源欄位。）
#[derive(Debug)]
pub struct PreviewEngine<S: ResourceStore = BlobStore> {
    store: S,
    language: LanguageId,
    last_session: SessionId,
    session: Option<PreviewSession>,
    tab: OutputTab,
    settle_delay: Duration,
    sandbox: SandboxPolicy,
}

impl PreviewEngine<BlobStore> {
    pub fn new(language: LanguageId) -> Self {
        Self::with_store(BlobStore::new(), language)
    }
}

impl<S: ResourceStore> PreviewEngine<S> {
    pub fn with_store(store: S, language: LanguageId) -> Self {
        Self {
            store,
            language,
            last_session: SessionId::new(0),
            session: None,
            tab: OutputTab::default_for(language),
            settle_delay: DEFAULT_SETTLE_DELAY,
            sandbox: SandboxPolicy::PREVIEW,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sandbox(&self) -> SandboxPolicy {
        self.sandbox
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    pub fn session(&self) -> Option<&PreviewSession> {
        self.session.as_ref()
    }

    pub fn active_tab(&self) -> OutputTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: OutputTab) {
        self.tab = tab;
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(PreviewSession::is_settling)
    }

    /// Console transcript of the current session.
    pub fn console(&self) -> &[ConsoleLine] {
        self.session
            .as_ref()
            .map(PreviewSession::console)
            .unwrap_or(&[])
    }

    /// Handle the rendering surface should display, if any.
    pub fn surface_handle(&self) -> Option<&ResourceHandle> {
        self.session.as_ref().and_then(PreviewSession::handle)
    }

    /// Document text behind the current handle.
    pub fn document_source(&self) -> Option<&str> {
        self.surface_handle()
            .and_then(|handle| self.store.fetch(handle))
    }

    /// `<iframe>` markup for the current handle.
    pub fn surface_tag(&self) -> Option<String> {
        self.surface_handle()
            .map(|handle| self.sandbox.embed_tag(handle))
    }

    /// Switches language: drops all session state and picks the default tab.
    pub fn set_language(&mut self, language: LanguageId) {
        if language == self.language {
            return;
        }
        debug!(from = %self.language, to = %language, "preview language changed");
        self.language = language;
        self.clear_session();
        self.tab = OutputTab::default_for(language);
    }

    /// Starts a run over a snapshot of `code`.
    pub fn begin_run(&mut self, code: &str) -> Result<RunTicket, PreviewError> {
        if self.is_running() {
            return Err(PreviewError::RunInProgress);
        }
        // The surface is blanked for the new run, so the old handle is unused.
        self.clear_session();

        let id = self.last_session.next();
        self.last_session = id;
        self.session = Some(PreviewSession {
            id,
            language: self.language,
            code: code.to_string(),
            mode: select_mode(self.language),
            state: SessionState::Settling,
            handle: None,
            injection: None,
            console: Vec::new(),
        });
        info!(session = %id, language = %self.language, "run started");
        Ok(RunTicket {
            session: id,
            ready_at: Instant::now() + self.settle_delay,
        })
    }

    /// Finishes the run identified by `ticket`.
    pub fn complete_run(&mut self, ticket: RunTicket) -> Result<&PreviewSession, PreviewError> {
        let session = match self.session.as_mut() {
            Some(session) if session.id == ticket.session && session.is_settling() => session,
            _ => return Err(PreviewError::StaleRun(ticket.session)),
        };

        match session.mode {
            RenderMode::WebDocument => {
                if let Some(document) =
                    synthesize_document(&session.code, session.language, session.id)
                {
                    session.injection = Some(document.injection);
                    session.handle = Some(self.store.create(session.id, document.html));
                }
                self.tab = OutputTab::Output;
            }
            RenderMode::Simulated => {
                session.console = simulated_transcript(session.language);
                self.tab = OutputTab::Console;
            }
        }
        session.state = SessionState::Ready;
        info!(session = %session.id, mode = ?session.mode, "run completed");
        Ok(session)
    }

    /// Begins and completes a run without waiting for the settle delay.
    pub fn run_now(&mut self, code: &str) -> Result<&PreviewSession, PreviewError> {
        let ticket = self.begin_run(code)?;
        self.complete_run(ticket)
    }

    /// Feeds one message from the rendering surface into the console.
    pub fn relay(&mut self, message: RelayMessage) -> RelayOutcome {
        let Some(session) = self.session.as_mut() else {
            return RelayOutcome::NoSession;
        };
        // Only a completed web document can be the sender.
        if session.is_settling() || session.mode == RenderMode::Simulated {
            debug!(active = %session.id, "discarding console message with no live document");
            return RelayOutcome::Stale;
        }
        if let Some(origin) = message.session {
            if origin != session.id {
                debug!(%origin, active = %session.id, "discarding stale console message");
                return RelayOutcome::Stale;
            }
        }
        session.console.push(message.into_line());
        RelayOutcome::Appended
    }

    /// Parses and relays a raw JSON payload.
    pub fn relay_raw(&mut self, raw: &str) -> RelayOutcome {
        match RelayMessage::parse(raw) {
            Some(message) => self.relay(message),
            None => RelayOutcome::Ignored,
        }
    }

    /// Releases everything; used when the owning view goes away.
    pub fn teardown(&mut self) {
        self.clear_session();
    }

    fn clear_session(&mut self) {
        if let Some(previous) = self.session.take() {
            if let Some(handle) = previous.handle {
                self.store.revoke(handle);
            }
        }
    }
}

impl<S: ResourceStore> Drop for PreviewEngine<S> {
    fn drop(&mut self) {
        self.clear_session();
    }
}
