use serde::{Deserialize, Serialize};

/// Severity of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleKind {
    Log,
    Error,
}

/// One immutable line of a run's console transcript.
/// （單次執行主控台紀錄中的一行，建立後不可變更。）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLine {
    kind: ConsoleKind,
    text: String,
}

impl ConsoleLine {
    pub fn log(text: impl Into<String>) -> Self {
        Self {
            kind: ConsoleKind::Log,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: ConsoleKind::Error,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> ConsoleKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_error(&self) -> bool {
        self.kind == ConsoleKind::Error
    }
}
