//! `weatherwise voice`: run a voice session for a fixed time.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use logging::LoggingObserver;
use tokio::time::{interval, sleep, MissedTickBehavior};
use weatherwise_voice::{VoiceSession, VoiceSnapshot};

use crate::config::AppContext;
use crate::observer::ConsoleObserver;
use crate::terminal_output::note_info;

const STATUS_EVERY: Duration = Duration::from_millis(500);
const METER_WIDTH: usize = 20;

fn status_line(snapshot: &VoiceSnapshot) -> String {
    let filled = ((snapshot.audio_level / 100.0) * METER_WIDTH as f32).round() as usize;
    let filled = filled.min(METER_WIDTH);
    format!(
        "[{}{}] {:>3.0} | {} | {} | vol {:.0}%",
        "#".repeat(filled),
        " ".repeat(METER_WIDTH - filled),
        snapshot.audio_level,
        if snapshot.is_speaking { "agent speaking" } else { "listening     " },
        if snapshot.is_muted { "muted" } else { "live " },
        snapshot.volume * 100.0
    )
}

pub async fn run(ctx: &AppContext, seconds: u64, muted: bool) -> Result<()> {
    let setup = ctx.config.voice_setup();
    let observer = Arc::new(LoggingObserver::new(
        "voice",
        Arc::new(ConsoleObserver { echo_user: true }),
    ));
    let session = VoiceSession::new(setup.settings, observer);
    if muted {
        session.mute(true);
    }

    note_info("connecting...");
    session.start(setup.params).await?;

    let deadline = sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);
    let mut ticker = interval(STATUS_EVERY);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => println!("{}", status_line(&session.snapshot())),
        }
    }

    session.end().await;
    Ok(())
}
