//! Structured logging for WeatherWise.
//!
//! Subscriber setup (console, rolling NDJSON files), redaction of API keys
//! in logged strings, and a session event logger.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, LoggingObserver, SessionLogEvent};
pub use logger::{init_console, init_logger};
pub use redact::redact_sensitive_data;
