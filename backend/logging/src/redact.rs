//! Log Redaction
//!
//! Scrubs API keys and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

/// `appid=...` / `api_key=...` / `apikey=...` query parameters.
static QUERY_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(appid|api_key|apikey)=[^&\s]+").expect("valid query key pattern")
});
static BEARER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").expect("valid bearer pattern")
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = QUERY_KEY_RE.replace_all(input, "$1=[REDACTED]");
    BEARER_RE
        .replace_all(&redacted, "Bearer [REDACTED_TOKEN]")
        .into_owned()
}
