//! Messages posted from the rendering surface back to the host.
//! （渲染區傳回宿主端的訊息。）

use serde_json::Value;

use crate::console::{ConsoleKind, ConsoleLine};
use crate::resource::SessionId;

/// A well-formed `{ type: "console" | "error", message }` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMessage {
    pub kind: ConsoleKind,
    pub message: String,
    /// Run that produced the message, when the sender stamped one.
    pub session: Option<SessionId>,
}

impl RelayMessage {
    pub fn console(message: impl Into<String>, session: Option<SessionId>) -> Self {
        Self {
            kind: ConsoleKind::Log,
            message: message.into(),
            session,
        }
    }

    pub fn error(message: impl Into<String>, session: Option<SessionId>) -> Self {
        Self {
            kind: ConsoleKind::Error,
            message: message.into(),
            session,
        }
    }

    /// Accepts only objects whose `type` is `console` or `error` and whose
    /// `message` is a string. Everything else is `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let kind = match object.get("type")?.as_str()? {
            "console" => ConsoleKind::Log,
            "error" => ConsoleKind::Error,
            _ => return None,
        };
        let message = object.get("message")?.as_str()?.to_string();
        let session = match object.get("session") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(SessionId::new(raw.as_u64()?)),
        };
        Some(Self {
            kind,
            message,
            session,
        })
    }

    /// Parses a raw JSON payload; malformed JSON is treated like any other
    /// unrecognized shape.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(|value| Self::from_value(&value))
    }

    pub fn into_line(self) -> ConsoleLine {
        match self.kind {
            ConsoleKind::Log => ConsoleLine::log(self.message),
            ConsoleKind::Error => ConsoleLine::error(self.message),
        }
    }
}

/// What the relay did with one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Appended to the active session's console.
    Appended,
    /// Not a console/error message.
    Ignored,
    /// Stamped with a session that is no longer active, or arrived while no
    /// rendered document exists (settling or simulated runs).
    Stale,
    /// No run is active to receive it.
    NoSession,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_console_and_error_kinds() {
        let msg = RelayMessage::parse(r#"{"type":"console","message":"hi","session":3}"#).unwrap();
        assert_eq!(msg, RelayMessage::console("hi", Some(SessionId::new(3))));
        let msg = RelayMessage::parse(r#"{"type":"error","message":"boom (Line 2)"}"#).unwrap();
        assert_eq!(msg, RelayMessage::error("boom (Line 2)", None));
    }

    #[test]
    fn other_shapes_are_rejected() {
        for value in [
            json!({"type": "warn", "message": "x"}),
            json!({"type": "console"}),
            json!({"type": "console", "message": 5}),
            json!({"type": "console", "message": "x", "session": "one"}),
            json!({"message": "x"}),
            json!(["console", "x"]),
            json!("console"),
        ] {
            assert!(RelayMessage::from_value(&value).is_none(), "{value}");
        }
        assert!(RelayMessage::parse("not json").is_none());
    }

    #[test]
    fn null_session_counts_as_unstamped() {
        let msg = RelayMessage::from_value(&json!({"type": "console", "message": "x", "session": null}))
            .unwrap();
        assert_eq!(msg.session, None);
    }
}
