//! Runs generation requests off the UI thread.
//! （在背景執行緒執行產生請求，避免阻塞畫面。）

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use codegenius_controller::GenerationRequest;
use codegenius_generation::{CodeGenerator, GenerationError, GenerationService};
use tracing::{debug, warn};

/// Result of one request, tagged with its id.
pub type Completion = (u64, Result<String, GenerationError>);

pub struct GenerationWorker<S> {
    generator: Arc<CodeGenerator<S>>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl<S> GenerationWorker<S>
where
    S: GenerationService + Send + Sync + 'static,
{
    pub fn new(generator: CodeGenerator<S>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            generator: Arc::new(generator),
            tx,
            rx,
        }
    }

    pub fn generator(&self) -> &CodeGenerator<S> {
        &self.generator
    }

    /// Starts `request` on a new thread; `notify` runs once the result is queued.
    pub fn spawn<F>(&self, request: GenerationRequest, notify: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let generator = Arc::clone(&self.generator);
        let tx = self.tx.clone();
        debug!(request = request.id, "spawning generation thread");
        thread::spawn(move || {
            let outcome = generator.generate(request.language, &request.prompt);
            if tx.send((request.id, outcome)).is_err() {
                warn!(request = request.id, "generation finished after the window closed");
                return;
            }
            notify();
        });
    }

    /// Next finished request, if any.
    pub fn poll(&self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
