use thiserror::Error;

use crate::types::SessionStatus;

/// Errors surfaced by the chat and voice session simulators.
///
/// Every variant is recoverable: the session that produced it is left in a
/// consistent (usually idle or disconnected) state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The simulated operation did not complete before its deadline.
    #[error("operation timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// `start()` was called while the session was not disconnected.
    #[error("session is already {status}")]
    AlreadyConnected { status: SessionStatus },

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// A pending handshake was abandoned by `end()` or `fail()`.
    #[error("session start was cancelled before the handshake completed")]
    Cancelled,

    /// Abnormal session termination.
    #[error("session failed: {0}")]
    Failed(String),
}

impl SessionError {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        SessionError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "operation timed out after 5000 ms");

        let err = SessionError::AlreadyConnected {
            status: SessionStatus::Connecting,
        };
        assert_eq!(err.to_string(), "session is already connecting");

        let err = SessionError::invalid_argument("volume", "1.5 is outside [0, 1]");
        assert_eq!(
            err.to_string(),
            "invalid argument `volume`: 1.5 is outside [0, 1]"
        );
    }

    #[test]
    fn test_is_timeout() {
        assert!(SessionError::Timeout { timeout_ms: 1 }.is_timeout());
        assert!(!SessionError::Cancelled.is_timeout());
    }
}
