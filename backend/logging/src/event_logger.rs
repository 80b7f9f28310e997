//! Session Event Logger
//!
//! Lifecycle events (connect, disconnect, message, error) recorded through
//! `tracing` under the `session_events` target, so the NDJSON file layer
//! picks them up.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use weatherwise_core::{Message, SessionError, SessionHandle, SessionObserver};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionLogEvent {
    Connected { handle: String },
    Disconnected,
    Message { role: String, text: String },
    Error { error_msg: String },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionLogEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact, stamp, and emit one event. Returns the entry as logged.
    pub fn log_event(session_id: &str, mut event: SessionLogEvent) -> EventLogEntry {
        match &mut event {
            SessionLogEvent::Message { text, .. } => *text = redact_sensitive_data(text),
            SessionLogEvent::Error { error_msg } => *error_msg = redact_sensitive_data(error_msg),
            SessionLogEvent::Connected { .. } | SessionLogEvent::Disconnected => {}
        }

        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry.event).unwrap_or_default();
        info!(target: "session_events", session_id = %entry.session_id, event = %json, "Session event");
        entry
    }
}

/// Observer decorator that logs every event before forwarding it.
///
/// Events are keyed by the session id given at construction until the
/// session connects, and by the connection handle afterwards.
pub struct LoggingObserver {
    session_id: Mutex<String>,
    inner: Arc<dyn SessionObserver>,
}

impl LoggingObserver {
    pub fn new(session_id: impl Into<String>, inner: Arc<dyn SessionObserver>) -> Self {
        Self {
            session_id: Mutex::new(session_id.into()),
            inner,
        }
    }

    fn session_id(&self) -> String {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionObserver for LoggingObserver {
    fn on_connect(&self, handle: &SessionHandle) {
        *self.session_id.lock().unwrap_or_else(PoisonError::into_inner) =
            handle.as_str().to_string();
        EventLogger::log_event(
            handle.as_str(),
            SessionLogEvent::Connected {
                handle: handle.as_str().to_string(),
            },
        );
        self.inner.on_connect(handle);
    }

    fn on_disconnect(&self) {
        EventLogger::log_event(&self.session_id(), SessionLogEvent::Disconnected);
        self.inner.on_disconnect();
    }

    fn on_message(&self, message: &Message) {
        EventLogger::log_event(
            &self.session_id(),
            SessionLogEvent::Message {
                role: message.role.to_string(),
                text: message.text.clone(),
            },
        );
        self.inner.on_message(message);
    }

    fn on_error(&self, error: &SessionError) {
        EventLogger::log_event(
            &self.session_id(),
            SessionLogEvent::Error {
                error_msg: error.to_string(),
            },
        );
        self.inner.on_error(error);
    }
}
