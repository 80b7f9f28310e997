//! `weatherwise config`.

use anyhow::Result;
use weatherwise_config::{redacted_config, validate, write_config};

use crate::config::AppContext;
use crate::terminal_output::{note_info, note_success, note_warn};

/// Print the effective config (secrets masked), or report where it lives
/// and write a starter file when none exists.
pub async fn run(ctx: &AppContext, show: bool) -> Result<()> {
    if show {
        let value = redacted_config(&ctx.config);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    note_info(&format!("config file: {}", ctx.path.display()));
    if !ctx.path.exists() {
        write_config(&ctx.config, &ctx.path).await?;
        note_success("wrote defaults");
    }
    for warning in validate(&ctx.config).warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    Ok(())
}

