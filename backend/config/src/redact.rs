//! Safe-to-print config snapshots with secrets masked.

use serde_json::Value;

use crate::schema::WeatherWiseConfig;

static SENSITIVE_KEYS: &[&str] = &["apiKey", "api_key", "appid", "token", "secret", "password"];

/// Replace every sensitive string with its first four characters plus `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

/// Serialize a typed config and redact it.
pub fn redacted_config(config: &WeatherWiseConfig) -> Value {
    redact(&serde_json::to_value(config).unwrap_or(Value::Null))
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    // Env references are not secrets.
    if s.starts_with("${") {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 8 {
        format!("{}***", chars[..4].iter().collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if !s.is_empty() && is_sensitive_key(key) => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Dotted paths of every value `redact` would mask.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_sensitive_key(key) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, &child_path, out);
            }
        }
        _ => {}
    }
}
