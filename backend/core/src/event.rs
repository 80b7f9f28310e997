use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::message::Message;
use crate::types::SessionHandle;

/// A lifecycle notification delivered to a session's observer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected(SessionHandle),
    Disconnected,
    Message(Message),
    Error(SessionError),
}

/// Categories of session events, used for logging and counting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Connected,
    Disconnected,
    Message,
    Error,
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::Connected(_) => EventKind::Connected,
            SessionEvent::Disconnected => EventKind::Disconnected,
            SessionEvent::Message(_) => EventKind::Message,
            SessionEvent::Error(_) => EventKind::Error,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(SessionEvent::Disconnected.kind(), EventKind::Disconnected);
        assert_eq!(
            SessionEvent::Message(Message::assistant("hi")).kind(),
            EventKind::Message
        );
        assert_eq!(
            SessionEvent::Error(SessionError::Cancelled).kind(),
            EventKind::Error
        );
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Connected.to_string(), "connected");
        assert_eq!(EventKind::Disconnected.to_string(), "disconnected");
    }
}
