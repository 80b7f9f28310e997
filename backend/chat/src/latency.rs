//! Simulated network/model latency with a hard deadline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use weatherwise_core::{DelayStrategy, SessionError, UniformDelay};

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Runs an operation after a simulated delay, failing with
/// [`SessionError::Timeout`] if the delay outlasts the deadline.
///
/// The delayed operation and the deadline live in one future: whichever
/// finishes first drops the other, so a timed-out operation never runs and
/// no timer outlives the call. Dropping the returned future cancels both.
#[derive(Clone)]
pub struct LatencySimulator {
    delay: Arc<dyn DelayStrategy>,
    timeout: Duration,
}

impl LatencySimulator {
    pub fn new(delay: Arc<dyn DelayStrategy>, timeout: Duration) -> Self {
        Self { delay, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn invoke<T, F>(&self, operation: F) -> Result<T, SessionError>
    where
        F: FnOnce() -> Result<T, SessionError>,
    {
        let delay = self.delay.next_delay();
        debug!(
            delay_ms = delay.as_millis() as u64,
            timeout_ms = self.timeout.as_millis() as u64,
            "Scheduling simulated operation"
        );

        let scheduled = async move {
            tokio::time::sleep(delay).await;
            operation()
        };

        match tokio::time::timeout(self.timeout, scheduled).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(timeout_ms, "Simulated operation timed out");
                Err(SessionError::Timeout { timeout_ms })
            }
        }
    }
}

impl Default for LatencySimulator {
    fn default() -> Self {
        Self::new(
            Arc::new(UniformDelay::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)),
            DEFAULT_TIMEOUT,
        )
    }
}

impl std::fmt::Debug for LatencySimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatencySimulator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;
    use weatherwise_core::FixedDelay;

    fn fixed(delay_ms: u64, timeout_ms: u64) -> LatencySimulator {
        LatencySimulator::new(
            Arc::new(FixedDelay(Duration::from_millis(delay_ms))),
            Duration::from_millis(timeout_ms),
        )
    }

    fn assert_elapsed(start: Instant, expected_ms: u64) {
        let elapsed = start.elapsed();
        let expected = Duration::from_millis(expected_ms);
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_after_delay() {
        let sim = fixed(800, 5000);
        let start = Instant::now();
        let value = sim.invoke(|| Ok(7)).await.unwrap();
        assert_eq!(value, 7);
        assert_elapsed(start, 800);
    }

    #[tokio::test(start_paused = true)]
    async fn propagates_operation_error() {
        let sim = fixed(10, 5000);
        let err = sim
            .invoke::<(), _>(|| Err(SessionError::Failed("boom".into())))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Failed("boom".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_discards_late_result() {
        let runs = Arc::new(AtomicUsize::new(0));
        let sim = fixed(6000, 5000);

        let start = Instant::now();
        let r = runs.clone();
        let err = sim
            .invoke(move || {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Timeout { timeout_ms: 5000 });
        assert_elapsed(start, 5000);

        // Long past the operation's own deadline: it must never have run.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_call_never_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let sim = fixed(1000, 5000);

        let r = runs.clone();
        let task = tokio::spawn(async move {
            sim.invoke(move || {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        task.abort();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_invocations_are_independent() {
        let sim = fixed(1000, 5000);
        let start = Instant::now();
        let (a, b) = tokio::join!(sim.invoke(|| Ok("a")), sim.invoke(|| Ok("b")));
        assert_eq!((a.unwrap(), b.unwrap()), ("a", "b"));
        assert_elapsed(start, 1000);
    }

    #[test]
    fn default_timeout() {
        assert_eq!(LatencySimulator::default().timeout(), DEFAULT_TIMEOUT);
    }
}
