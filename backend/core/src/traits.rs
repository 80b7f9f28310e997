use std::time::Duration;

use rand::Rng;

use crate::error::SessionError;
use crate::message::Message;
use crate::types::SessionHandle;

/// Receives lifecycle notifications from a chat or voice session.
///
/// All methods default to no-ops so observers only implement what they use.
/// A session never calls back into its observer re-entrantly: events raised
/// while a callback is running are queued and delivered after it returns.
pub trait SessionObserver: Send + Sync {
    fn on_connect(&self, _handle: &SessionHandle) {}

    fn on_disconnect(&self) {}

    fn on_message(&self, _message: &Message) {}

    fn on_error(&self, _error: &SessionError) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

// ---------------------------------------------------------------------------
// Delay strategies
// ---------------------------------------------------------------------------

/// Source of simulated latency.
pub trait DelayStrategy: Send + Sync {
    fn next_delay(&self) -> Duration;
}

impl<F> DelayStrategy for F
where
    F: Fn() -> Duration + Send + Sync,
{
    fn next_delay(&self) -> Duration {
        self()
    }
}

/// Always the same delay.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl DelayStrategy for FixedDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// Delay drawn uniformly from `[min, max]` (inclusive, millisecond precision).
#[derive(Debug, Clone, Copy)]
pub struct UniformDelay {
    min: Duration,
    max: Duration,
}

impl UniformDelay {
    /// Bounds given in the wrong order are swapped.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    pub fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }
}

impl DelayStrategy for UniformDelay {
    fn next_delay(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

// ---------------------------------------------------------------------------
// Audio level sampling
// ---------------------------------------------------------------------------

/// Source of simulated microphone levels in `[0, 100]`.
pub trait LevelSampler: Send + Sync {
    fn sample(&self) -> f32;
}

impl<F> LevelSampler for F
where
    F: Fn() -> f32 + Send + Sync,
{
    fn sample(&self) -> f32 {
        self()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomLevel;

impl LevelSampler for RandomLevel {
    fn sample(&self) -> f32 {
        rand::thread_rng().gen_range(0.0..=100.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLevel(pub f32);

impl LevelSampler for FixedLevel {
    fn sample(&self) -> f32 {
        self.0
    }
}
