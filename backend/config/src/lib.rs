//! `weatherwise-config`: configuration for the WeatherWise simulators.
//!
//! Provides:
//! - Typed config schema (chat, voice, providers, logging)
//! - YAML read/write with atomic replace
//! - `${ENV_VAR}` substitution
//! - Default value application and validation
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod settings;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{collect_redacted_paths, redact, redacted_config};
pub use schema::WeatherWiseConfig;
pub use settings::{ChatSettings, LogSettings, VoiceSetup};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply defaults, and validate a config file.
///
/// Validation errors abort; warnings are logged.
pub async fn load_and_prepare(path: &Path) -> Result<WeatherWiseConfig> {
    let raw = load_config(path).await?;
    prepare_with(raw, &std::env::vars().collect())
}

/// The pipeline behind [`load_and_prepare`] for an already-parsed config.
pub fn prepare_with(
    raw: WeatherWiseConfig,
    env: &HashMap<String, String>,
) -> Result<WeatherWiseConfig> {
    let value: Value =
        serde_json::to_value(&raw).context("Failed to serialize config for processing")?;

    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: WeatherWiseConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }

    Ok(config)
}
