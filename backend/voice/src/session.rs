//! Long-lived simulated voice session.
//!
//! `disconnected --start--> connecting --handshake--> connected --end/fail--> disconnected`
//!
//! While connected the session owns three timers: a speaking toggle, an
//! audio-level sampler (only while unmuted) and a one-shot greeting. Every
//! timer body re-checks the connection epoch under the state lock before
//! touching anything, and every exit from `connected` bumps the epoch and
//! aborts the timers while holding that same lock. Once `end()` returns no
//! timer can change state or raise an event.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use weatherwise_core::{
    EventDispatcher, LevelSampler, Message, RandomLevel, SessionError, SessionEvent,
    SessionHandle, SessionObserver, SessionStatus,
};

/// `tokio::time::interval` panics on a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub const GREETING: &str =
    "Hello! I can help you with weather data and activity recommendations. What would you like to know?";

/// Timing knobs for the simulation.
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub handshake: Duration,
    pub speaking_interval: Duration,
    pub audio_level_interval: Duration,
    /// Delay between entering `connected` and the greeting message.
    pub greeting_delay: Duration,
    pub default_volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            handshake: Duration::from_millis(1000),
            speaking_interval: Duration::from_millis(2000),
            audio_level_interval: Duration::from_millis(100),
            greeting_delay: Duration::from_millis(1500),
            default_volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl StartParams {
    pub fn with_agent(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
        }
    }
}

/// Point-in-time view of the observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSnapshot {
    pub status: SessionStatus,
    pub is_speaking: bool,
    pub is_muted: bool,
    pub volume: f32,
    pub audio_level: f32,
}

#[derive(Default)]
struct Timers {
    speaking: Option<JoinHandle<()>>,
    audio: Option<JoinHandle<()>>,
    greeting: Option<JoinHandle<()>>,
}

impl Timers {
    fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for timer in [
            self.speaking.take(),
            self.audio.take(),
            self.greeting.take(),
        ]
        .into_iter()
        .flatten()
        {
            timer.abort();
            cancelled += 1;
        }
        cancelled
    }

    fn live(&self) -> usize {
        [&self.speaking, &self.audio, &self.greeting]
            .into_iter()
            .flatten()
            .filter(|timer| !timer.is_finished())
            .count()
    }
}

struct VoiceState {
    status: SessionStatus,
    is_speaking: bool,
    is_muted: bool,
    volume: f32,
    audio_level: f32,
    /// Bumped on every lifecycle transition; stale timers and handshakes
    /// compare against it and bail.
    epoch: u64,
    /// Bumped whenever the audio-level timer is stopped or restarted.
    audio_gen: u64,
    handle: Option<SessionHandle>,
    agent_id: Option<String>,
    runtime: Option<Handle>,
    timers: Timers,
}

impl VoiceState {
    fn new(volume: f32) -> Self {
        Self {
            status: SessionStatus::Disconnected,
            is_speaking: false,
            is_muted: false,
            volume,
            audio_level: 0.0,
            epoch: 0,
            audio_gen: 0,
            handle: None,
            agent_id: None,
            runtime: None,
            timers: Timers::default(),
        }
    }

    fn is_live(&self, epoch: u64) -> bool {
        self.status == SessionStatus::Connected && self.epoch == epoch
    }

    /// Cancel every timer and fall back to the inert disconnected state.
    fn teardown(&mut self) -> usize {
        self.epoch += 1;
        self.audio_gen += 1;
        let cancelled = self.timers.cancel_all();
        self.status = SessionStatus::Disconnected;
        self.is_speaking = false;
        self.audio_level = 0.0;
        self.handle = None;
        cancelled
    }
}

struct VoiceInner {
    state: Mutex<VoiceState>,
    settings: VoiceSettings,
    sampler: Arc<dyn LevelSampler>,
    events: EventDispatcher,
}

impl VoiceInner {
    fn lock(&self) -> MutexGuard<'_, VoiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for VoiceInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.timers.cancel_all();
    }
}

/// Cheaply cloneable handle to one voice session.
#[derive(Clone)]
pub struct VoiceSession {
    inner: Arc<VoiceInner>,
}

impl VoiceSession {
    pub fn new(settings: VoiceSettings, observer: Arc<dyn SessionObserver>) -> Self {
        Self::with_sampler(settings, Arc::new(RandomLevel), observer)
    }

    pub fn with_sampler(
        settings: VoiceSettings,
        sampler: Arc<dyn LevelSampler>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let state = VoiceState::new(settings.default_volume);
        Self {
            inner: Arc::new(VoiceInner {
                state: Mutex::new(state),
                settings,
                sampler,
                events: EventDispatcher::new(observer),
            }),
        }
    }

    /// Connect after the simulated handshake.
    ///
    /// Fails with [`SessionError::AlreadyConnected`] unless disconnected, and
    /// with [`SessionError::Cancelled`] if `end()`/`fail()` lands during the
    /// handshake. Dropping the returned future mid-handshake returns the
    /// session to `disconnected`.
    pub async fn start(&self, params: StartParams) -> Result<SessionHandle, SessionError> {
        let epoch = {
            let mut state = self.inner.lock();
            if state.status != SessionStatus::Disconnected {
                warn!(status = %state.status, "Voice start rejected");
                return Err(SessionError::AlreadyConnected {
                    status: state.status,
                });
            }
            state.status = SessionStatus::Connecting;
            state.epoch += 1;
            state.agent_id = params.agent_id;
            state.runtime = Some(Handle::current());
            state.epoch
        };
        info!(epoch, "Voice session connecting");

        let mut guard = HandshakeGuard {
            inner: &self.inner,
            epoch,
            armed: true,
        };
        tokio::time::sleep(self.inner.settings.handshake).await;

        let handle = {
            let mut state = self.inner.lock();
            guard.armed = false;
            if state.epoch != epoch || state.status != SessionStatus::Connecting {
                debug!(epoch, "Discarding stale handshake");
                return Err(SessionError::Cancelled);
            }

            let handle = SessionHandle::generate();
            state.status = SessionStatus::Connected;
            state.handle = Some(handle.clone());
            self.inner
                .events
                .enqueue(SessionEvent::Connected(handle.clone()));

            state.timers.speaking = Some(self.spawn_speaking(epoch));
            if !state.is_muted {
                let generation = state.audio_gen;
                state.timers.audio = Some(self.spawn_audio(epoch, generation));
            }
            state.timers.greeting = Some(self.spawn_greeting(epoch));

            info!(session = %handle, agent = ?state.agent_id, "Voice session connected");
            handle
        };
        self.inner.events.flush();
        Ok(handle)
    }

    /// Disconnect and cancel every timer. Idempotent; safe mid-handshake.
    pub async fn end(&self) {
        {
            let mut state = self.inner.lock();
            if state.status == SessionStatus::Disconnected {
                debug!("Voice end ignored: already disconnected");
                return;
            }
            let from = state.status;
            let cancelled = state.teardown();
            self.inner.events.enqueue(SessionEvent::Disconnected);
            info!(from = %from, timers = cancelled, "Voice session ended");
        }
        self.inner.events.flush();
    }

    /// Abnormal termination: same teardown as [`end`](Self::end), reporting
    /// `on_error` before `on_disconnect`. No-op when disconnected.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        {
            let mut state = self.inner.lock();
            if state.status == SessionStatus::Disconnected {
                return;
            }
            let cancelled = state.teardown();
            warn!(reason = %reason, timers = cancelled, "Voice session failed");
            self.inner
                .events
                .enqueue(SessionEvent::Error(SessionError::Failed(reason)));
            self.inner.events.enqueue(SessionEvent::Disconnected);
        }
        self.inner.events.flush();
    }

    /// While muted the audio level is held at 0.
    pub fn mute(&self, muted: bool) {
        let mut state = self.inner.lock();
        if state.is_muted == muted {
            return;
        }
        state.is_muted = muted;
        state.audio_gen += 1;

        if muted {
            if let Some(timer) = state.timers.audio.take() {
                timer.abort();
            }
            state.audio_level = 0.0;
        } else if state.status == SessionStatus::Connected {
            let (epoch, generation) = (state.epoch, state.audio_gen);
            if let Some(runtime) = state.runtime.clone() {
                state.timers.audio = Some(self.spawn_audio_on(&runtime, epoch, generation));
            }
        }
        debug!(muted, "Voice mute toggled");
    }

    /// Values outside `[0, 1]` are rejected, not clamped.
    pub async fn set_volume(&self, volume: f32) -> Result<(), SessionError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(SessionError::invalid_argument(
                "volume",
                format!("{volume} is outside [0, 1]"),
            ));
        }
        self.inner.lock().volume = volume;
        info!("Volume set to: {}%", (volume * 100.0).round());
        Ok(())
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.lock().status
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.lock().is_speaking
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().is_muted
    }

    pub fn volume(&self) -> f32 {
        self.inner.lock().volume
    }

    pub fn audio_level(&self) -> f32 {
        self.inner.lock().audio_level
    }

    pub fn handle(&self) -> Option<SessionHandle> {
        self.inner.lock().handle.clone()
    }

    pub fn agent_id(&self) -> Option<String> {
        self.inner.lock().agent_id.clone()
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        let state = self.inner.lock();
        VoiceSnapshot {
            status: state.status,
            is_speaking: state.is_speaking,
            is_muted: state.is_muted,
            volume: state.volume,
            audio_level: state.audio_level,
        }
    }

    /// Timers that are scheduled and have not finished.
    pub fn active_timers(&self) -> usize {
        self.inner.lock().timers.live()
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    fn weak(&self) -> Weak<VoiceInner> {
        Arc::downgrade(&self.inner)
    }

    fn spawn_speaking(&self, epoch: u64) -> JoinHandle<()> {
        let weak = self.weak();
        let period = self.inner.settings.speaking_interval.max(MIN_PERIOD);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let mut state = inner.lock();
                if !state.is_live(epoch) {
                    break;
                }
                state.is_speaking = !state.is_speaking;
                debug!(speaking = state.is_speaking, "Speaking toggled");
            }
        })
    }

    fn spawn_audio(&self, epoch: u64, generation: u64) -> JoinHandle<()> {
        self.spawn_audio_on(&Handle::current(), epoch, generation)
    }

    fn spawn_audio_on(&self, runtime: &Handle, epoch: u64, generation: u64) -> JoinHandle<()> {
        let weak = self.weak();
        let period = self.inner.settings.audio_level_interval.max(MIN_PERIOD);
        runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let mut state = inner.lock();
                if !state.is_live(epoch) || state.audio_gen != generation || state.is_muted {
                    break;
                }
                state.audio_level = inner.sampler.sample().clamp(0.0, 100.0);
            }
        })
    }

    fn spawn_greeting(&self, epoch: u64) -> JoinHandle<()> {
        let weak = self.weak();
        let delay = self.inner.settings.greeting_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else { return };
            {
                let mut state = inner.lock();
                if !state.is_live(epoch) {
                    return;
                }
                state.timers.greeting = None;
                inner
                    .events
                    .enqueue(SessionEvent::Message(Message::assistant(GREETING)));
            }
            inner.events.flush();
        })
    }
}

impl std::fmt::Debug for VoiceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSession")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Returns the session to `disconnected` if `start()` is dropped mid-handshake.
struct HandshakeGuard<'a> {
    inner: &'a VoiceInner,
    epoch: u64,
    armed: bool,
}

impl Drop for HandshakeGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inner.lock();
        if state.epoch == self.epoch && state.status == SessionStatus::Connecting {
            warn!(epoch = self.epoch, "Handshake abandoned by caller");
            state.teardown();
        }
    }
}
