//! Terminal output: ANSI styling, notes, and chat transcript rendering.

use weatherwise_core::{Message, Role};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

fn styled(style: &str, text: &str) -> String {
    if supports_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Chat transcript
// ---------------------------------------------------------------------------

/// Render one message with its recommendation and numbered suggestions.
pub fn render_message(message: &Message) -> String {
    let label = match message.role {
        Role::User => styled(BOLD, "you"),
        Role::Assistant => styled(&format!("{CYAN}{BOLD}"), "weatherwise"),
        Role::System => styled(DIM, "system"),
    };
    let mut out = format!("{label}: {}\n", message.text);

    if let Some(rec) = &message.recommendation {
        out.push_str(&format!(
            "  → {} ({:.4}, {:.4}) score {}\n",
            rec.place_name,
            rec.latitude(),
            rec.longitude(),
            rec.score
        ));
        for reason in &rec.reasons {
            out.push_str(&format!("    • {reason}\n"));
        }
    }
    for (i, suggestion) in message.suggestions.iter().enumerate() {
        out.push_str(&format!("  {} {suggestion}\n", styled(DIM, &format!("/{}", i + 1))));
    }
    out
}
