//! Structured Logger
//!
//! Wraps `tracing` with console output, optional JSON formatting, daily
//! rolling NDJSON files, and `RUST_LOG` level control.

use std::path::Path;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "weatherwise.log";

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a console logger plus a rolling file logger writing
/// `weatherwise.log.YYYY-MM-DD` under `log_dir`. The console layer emits
/// JSON lines when `json` is set; the file is always NDJSON.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str, json: bool) -> bool {
    file_and_console(log_dir.as_ref(), level, json, std::io::stderr)
        .try_init()
        .is_ok()
}

fn file_and_console<W>(
    log_dir: &Path,
    level: &str,
    json: bool,
    console: W,
) -> impl Subscriber + Send + Sync + use<W>
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    // Stderr keeps stdout free for command output.
    let json_console = json.then(|| fmt::layer().json().with_writer(console.clone()));
    let text_console = (!json).then(|| {
        fmt::layer()
            .with_writer(console)
            .with_target(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(filter(level))
        .with(json_console)
        .with(text_console)
        .with(file_layer)
}

/// Install a console-only logger, as JSON lines when `json` is set.
pub fn init_console(level: &str, json: bool) -> bool {
    let registry = tracing_subscriber::registry().with(filter(level));
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
    };
    result.is_ok()
}
