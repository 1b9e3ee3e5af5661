//! Preview engine: turns a code snapshot into a sandboxed web document or a
//! simulated console transcript, and owns the lifecycle of the rendered resource.
//! （預覽引擎：將程式碼轉成沙盒網頁文件或模擬主控台輸出，並管理資源生命週期。）

pub mod console;
pub mod document;
pub mod engine;
pub mod instrument;
pub mod mode;
pub mod relay;
pub mod resource;
pub mod simulate;

pub use console::{ConsoleKind, ConsoleLine};
pub use document::{synthesize_document, InjectionPoint, SynthesizedDocument};
pub use engine::{
    OutputTab, PreviewEngine, PreviewError, PreviewSession, RunTicket, DEFAULT_SETTLE_DELAY,
};
pub use instrument::instrumentation_snippet;
pub use mode::{select_mode, RenderMode};
pub use relay::{RelayMessage, RelayOutcome};
pub use resource::{BlobStore, ResourceHandle, ResourceStore, SandboxPolicy, SessionId};
pub use simulate::simulated_transcript;
