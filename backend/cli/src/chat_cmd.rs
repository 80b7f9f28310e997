//! `weatherwise chat`: interactive REPL over a chat session.

use std::sync::Arc;

use anyhow::Result;
use logging::LoggingObserver;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use weatherwise_chat::{ChatOptions, ChatSession, LatencySimulator, RejectReason, SubmitOutcome};
use weatherwise_core::{Message, Role, UniformDelay};

use crate::config::AppContext;
use crate::observer::ConsoleObserver;
use crate::terminal_output::{note_info, note_warn, render_message};

#[derive(Debug, PartialEq)]
enum Input {
    Quit,
    /// 1-based suggestion index.
    Pick(usize),
    Text(String),
    Empty,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if line == "/quit" || line == "/exit" {
        return Input::Quit;
    }
    match line.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
        Some(n) if n > 0 => Input::Pick(n),
        _ => Input::Text(line.to_string()),
    }
}

/// Suggestions on the most recent message that offers any.
fn latest_suggestions(log: &[Message]) -> Vec<String> {
    log.iter()
        .rev()
        .find(|m| m.role != Role::User && !m.suggestions.is_empty())
        .map(|m| m.suggestions.clone())
        .unwrap_or_default()
}

pub async fn run(ctx: &AppContext, profile: Option<String>) -> Result<()> {
    let settings = ctx.config.chat_settings();
    let latency = LatencySimulator::new(
        Arc::new(UniformDelay::new(settings.min_delay, settings.max_delay)),
        settings.timeout,
    );
    let observer = Arc::new(LoggingObserver::new(
        "chat",
        Arc::new(ConsoleObserver { echo_user: false }),
    ));
    let session = ChatSession::open(
        ChatOptions {
            profile: profile.or(settings.profile),
            seed_welcome: true,
        },
        latency,
        observer,
    );

    for message in session.messages() {
        print!("{}", render_message(&message));
    }
    note_info("type a question, /N to pick a suggestion, /quit to leave");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = match parse_input(&line) {
            Input::Quit => break,
            Input::Empty => continue,
            Input::Pick(n) => {
                let Some(choice) = latest_suggestions(&session.messages()).get(n - 1).cloned()
                else {
                    note_warn(&format!("no suggestion /{n}"));
                    continue;
                };
                session.select_suggestion(&choice);
                print!("{}", render_message(&Message::user(choice)));
                session.submit_pending().await
            }
            Input::Text(text) => session.submit(&text).await,
        };

        match outcome {
            Ok(SubmitOutcome::Answered(_)) => {}
            Ok(SubmitOutcome::Rejected(RejectReason::Closed)) => break,
            Ok(SubmitOutcome::Rejected(reason)) => note_warn(&format!("ignored: {reason:?}")),
            // Already reported through the observer.
            Err(e) => debug!(error = %e, "Chat turn failed"),
        }
    }

    session.close();
    Ok(())
}
