//! Turn-based chat session.
//!
//! `idle → awaiting-response → idle`. The user message is appended before
//! the first await; while a reply is in flight every further submission is
//! rejected, so replies land in the log in the order they were requested.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use weatherwise_core::{
    EventDispatcher, Message, SessionError, SessionEvent, SessionHandle, SessionObserver,
};

use crate::latency::LatencySimulator;
use crate::responder;

const WELCOME_SUGGESTIONS: [&str; 4] = [
    "Find a location for an outdoor wedding",
    "Best spots for a music festival",
    "Safe hiking areas this weekend",
    "Ideal farming conditions nearby",
];

/// How a chat surface is opened.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Persona slug such as `outdoor-enthusiast`, mentioned in the welcome.
    pub profile: Option<String>,
    /// Seed the log with the system welcome message.
    pub seed_welcome: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            profile: None,
            seed_welcome: true,
        }
    }
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    /// A reply is already in flight.
    Busy,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Answered(Message),
    Rejected(RejectReason),
}

#[derive(Default)]
struct ChatState {
    messages: Vec<Message>,
    is_responding: bool,
    pending_input: String,
    closed: bool,
}

struct ChatInner {
    handle: SessionHandle,
    state: Mutex<ChatState>,
    latency: LatencySimulator,
    events: EventDispatcher,
}

impl ChatInner {
    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheaply cloneable handle to one chat conversation.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<ChatInner>,
}

impl ChatSession {
    /// Open a session and fire `on_connect`.
    pub fn open(
        options: ChatOptions,
        latency: LatencySimulator,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let mut state = ChatState::default();
        if options.seed_welcome {
            state.messages.push(welcome_message(options.profile.as_deref()));
        }

        let handle = SessionHandle::generate();
        let inner = Arc::new(ChatInner {
            handle: handle.clone(),
            state: Mutex::new(state),
            latency,
            events: EventDispatcher::new(observer),
        });

        info!(session = %handle, profile = ?options.profile, "Chat session opened");
        inner.events.emit(SessionEvent::Connected(handle));
        Self { inner }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.inner.handle
    }

    /// Submit user text and wait for the simulated reply.
    ///
    /// Blank input, a reply already in flight, or a closed session yield
    /// `Ok(SubmitOutcome::Rejected(..))` with no effect on the log. A
    /// timeout leaves only the user message behind and is returned as `Err`.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, SessionError> {
        if text.trim().is_empty() {
            debug!(session = %self.inner.handle, "Ignoring blank submission");
            return Ok(SubmitOutcome::Rejected(RejectReason::EmptyInput));
        }

        {
            let mut state = self.inner.lock();
            if state.closed {
                return Ok(SubmitOutcome::Rejected(RejectReason::Closed));
            }
            if state.is_responding {
                warn!(session = %self.inner.handle, "Submission rejected: reply already in flight");
                return Ok(SubmitOutcome::Rejected(RejectReason::Busy));
            }
            state.messages.push(Message::user(text));
            state.is_responding = true;
        }

        let mut guard = RespondingGuard {
            inner: &self.inner,
            armed: true,
        };

        let prompt = text.to_string();
        let result = self
            .inner
            .latency
            .invoke(move || Ok(responder::reply_to(&prompt)))
            .await;

        let outcome = {
            let mut state = self.inner.lock();
            state.is_responding = false;
            guard.armed = false;

            match result {
                Ok(_) if state.closed => Err(SessionError::Cancelled),
                Ok(reply) => {
                    state.messages.push(reply.clone());
                    self.inner
                        .events
                        .enqueue(SessionEvent::Message(reply.clone()));
                    Ok(SubmitOutcome::Answered(reply))
                }
                Err(err) => {
                    warn!(session = %self.inner.handle, error = %err, "Chat turn failed");
                    if !state.closed {
                        self.inner.events.enqueue(SessionEvent::Error(err.clone()));
                    }
                    Err(err)
                }
            }
        };
        self.inner.events.flush();
        outcome
    }

    /// Put a suggestion into the pending input without submitting it.
    pub fn select_suggestion(&self, text: &str) {
        self.inner.lock().pending_input = text.to_string();
    }

    pub fn pending_input(&self) -> String {
        self.inner.lock().pending_input.clone()
    }

    pub fn take_pending_input(&self) -> String {
        std::mem::take(&mut self.inner.lock().pending_input)
    }

    /// Submit whatever is in the pending input, clearing it.
    pub async fn submit_pending(&self) -> Result<SubmitOutcome, SessionError> {
        let text = self.take_pending_input();
        self.submit(&text).await
    }

    /// Snapshot of the log in display order.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.lock().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.inner.lock().messages.len()
    }

    pub fn is_responding(&self) -> bool {
        self.inner.lock().is_responding
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Close the session and fire `on_disconnect`. Idempotent; a reply still
    /// in flight is discarded when it arrives.
    pub fn close(&self) {
        {
            let mut state = self.inner.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            self.inner.events.enqueue(SessionEvent::Disconnected);
        }
        info!(session = %self.inner.handle, "Chat session closed");
        self.inner.events.flush();
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("handle", &self.inner.handle)
            .field("messages", &self.message_count())
            .finish_non_exhaustive()
    }
}

/// Clears `is_responding` if `submit` is dropped mid-flight.
struct RespondingGuard<'a> {
    inner: &'a ChatInner,
    armed: bool,
}

impl Drop for RespondingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(session = %self.inner.handle, "Chat turn abandoned by caller");
            self.inner.lock().is_responding = false;
        }
    }
}

fn welcome_message(profile: Option<&str>) -> Message {
    let interest = profile
        .filter(|p| !p.is_empty())
        .map(|p| {
            format!(
                "I see you're interested in {} activities.",
                p.replacen('-', " ", 1)
            )
        })
        .unwrap_or_default();
    let text = format!(
        "Welcome to WeatherWise AI! I'm your intelligent weather assistant. {interest} I can help you find the perfect conditions and locations for your outdoor activities based on real-time weather data."
    );
    Message::system(text).with_suggestions(WELCOME_SUGGESTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use weatherwise_core::{FixedDelay, Role};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<&'static str>>,
    }

    impl SessionObserver for Recorder {
        fn on_connect(&self, _handle: &SessionHandle) {
            self.events.lock().unwrap().push("connect");
        }
        fn on_disconnect(&self) {
            self.events.lock().unwrap().push("disconnect");
        }
        fn on_message(&self, _message: &Message) {
            self.events.lock().unwrap().push("message");
        }
        fn on_error(&self, _error: &SessionError) {
            self.events.lock().unwrap().push("error");
        }
    }

    impl Recorder {
        fn events(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().clone()
        }
    }

    fn latency(delay_ms: u64, timeout_ms: u64) -> LatencySimulator {
        LatencySimulator::new(
            Arc::new(FixedDelay(Duration::from_millis(delay_ms))),
            Duration::from_millis(timeout_ms),
        )
    }

    fn open(options: ChatOptions, delay_ms: u64) -> (ChatSession, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let session = ChatSession::open(options, latency(delay_ms, 5000), recorder.clone());
        (session, recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn hiking_question_gets_central_park() {
        let options = ChatOptions {
            seed_welcome: false,
            ..Default::default()
        };
        let (session, recorder) = open(options, 800);

        let outcome = session
            .submit("Is it safe to hike this weekend?")
            .await
            .unwrap();

        let SubmitOutcome::Answered(reply) = outcome else {
            panic!("expected an answer");
        };
        let rec = reply.recommendation.unwrap();
        assert_eq!(rec.place_name, "Central Park Great Lawn, NYC");
        assert_eq!(rec.score, 88);

        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, Role::User);
        assert_eq!(log[1].role, Role::Assistant);
        assert_eq!(recorder.events(), vec!["connect", "message"]);
    }

    #[tokio::test(start_paused = true)]
    async fn turns_append_in_order() {
        let options = ChatOptions {
            seed_welcome: false,
            ..Default::default()
        };
        let (session, _) = open(options, 800);

        session.submit("hello there").await.unwrap();
        session.submit("What's the forecast?").await.unwrap();

        let log = session.messages();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0].text, "hello there");
        assert!(log[1].recommendation.is_none());
        assert_eq!(log[2].text, "What's the forecast?");
        assert_eq!(
            log[3].recommendation.as_ref().unwrap().place_name,
            "Golden Gate Park, San Francisco"
        );
        assert!(!session.is_responding());
    }

    #[tokio::test(start_paused = true)]
    async fn welcome_message_is_seeded() {
        let options = ChatOptions {
            profile: Some("outdoor-enthusiast".into()),
            seed_welcome: true,
        };
        let (session, _) = open(options, 800);

        let log = session.messages();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].role, Role::System);
        assert!(log[0]
            .text
            .contains("I see you're interested in outdoor enthusiast activities."));
        assert_eq!(log[0].suggestions.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_submissions_are_rejected_while_responding() {
        let (session, _) = open(ChatOptions::default(), 1000);

        let (first, second, third) = tokio::join!(
            session.submit("weather today?"),
            session.submit("and tomorrow?"),
            session.submit("hiking?"),
        );

        assert!(matches!(first.unwrap(), SubmitOutcome::Answered(_)));
        assert_eq!(
            second.unwrap(),
            SubmitOutcome::Rejected(RejectReason::Busy)
        );
        assert_eq!(third.unwrap(), SubmitOutcome::Rejected(RejectReason::Busy));

        let users = session
            .messages()
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        assert_eq!(users, 1);
        // welcome + user + assistant
        assert_eq!(session.message_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn is_responding_tracks_flight() {
        let (session, _) = open(ChatOptions::default(), 1000);
        let s = session.clone();
        let task = tokio::spawn(async move { s.submit("forecast").await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(session.is_responding());
        assert_eq!(session.message_count(), 2);

        task.await.unwrap().unwrap();
        assert!(!session.is_responding());
        assert_eq!(session.message_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_ignored() {
        let (session, recorder) = open(ChatOptions::default(), 10);
        assert_eq!(
            session.submit("   \n\t").await.unwrap(),
            SubmitOutcome::Rejected(RejectReason::EmptyInput)
        );
        assert_eq!(session.message_count(), 1);
        assert_eq!(recorder.events(), vec!["connect"]);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_only_user_message() {
        // First turn outlasts the deadline, later turns are quick.
        let calls = AtomicUsize::new(0);
        let delay = move || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Duration::from_millis(6000)
            } else {
                Duration::from_millis(100)
            }
        };
        let recorder = Arc::new(Recorder::default());
        let session = ChatSession::open(
            ChatOptions::default(),
            LatencySimulator::new(Arc::new(delay), Duration::from_millis(5000)),
            recorder.clone(),
        );

        let err = session.submit("weather?").await.unwrap_err();
        assert!(err.is_timeout());
        assert!(!session.is_responding());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].role, Role::User);
        assert_eq!(recorder.events(), vec!["connect", "error"]);

        // Failures are non-fatal: the retry goes through.
        assert!(matches!(
            session.submit("weather?").await.unwrap(),
            SubmitOutcome::Answered(_)
        ));
        assert_eq!(session.message_count(), 4);
        assert_eq!(recorder.events(), vec!["connect", "error", "message"]);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_submit_returns_to_idle() {
        let (session, recorder) = open(ChatOptions::default(), 1000);
        let s = session.clone();
        let task = tokio::spawn(async move { s.submit("forecast").await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(session.is_responding());
        task.abort();
        let _ = task.await;

        assert!(!session.is_responding());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.message_count(), 2);
        assert_eq!(recorder.events(), vec!["connect"]);
    }

    #[tokio::test(start_paused = true)]
    async fn suggestion_fills_pending_input_only() {
        let (session, _) = open(ChatOptions::default(), 10);
        session.select_suggestion("UV index forecast");
        assert_eq!(session.pending_input(), "UV index forecast");
        assert_eq!(session.message_count(), 1);

        let outcome = session.submit_pending().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert_eq!(session.pending_input(), "");
        assert_eq!(session.messages()[1].text, "UV index forecast");
    }

    #[tokio::test(start_paused = true)]
    async fn close_is_idempotent_and_discards_late_reply() {
        let (session, recorder) = open(ChatOptions::default(), 1000);
        let s = session.clone();
        let task = tokio::spawn(async move { s.submit("forecast").await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        session.close();
        session.close();

        assert_eq!(task.await.unwrap(), Err(SessionError::Cancelled));
        assert_eq!(session.message_count(), 2);
        assert_eq!(recorder.events(), vec!["connect", "disconnect"]);
        assert_eq!(
            session.submit("again").await.unwrap(),
            SubmitOutcome::Rejected(RejectReason::Closed)
        );
    }

    /// Closes the session from inside `on_message`.
    #[derive(Default)]
    struct CloseOnReply {
        session: std::sync::OnceLock<ChatSession>,
        depth: AtomicUsize,
        max_depth: AtomicUsize,
        events: Mutex<Vec<&'static str>>,
    }

    impl CloseOnReply {
        fn enter(&self, what: &'static str) {
            let d = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_depth.fetch_max(d, Ordering::SeqCst);
            self.events.lock().unwrap().push(what);
        }
        fn exit(&self) {
            self.depth.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl SessionObserver for CloseOnReply {
        fn on_connect(&self, _handle: &SessionHandle) {
            self.enter("connect");
            self.exit();
        }
        fn on_message(&self, _message: &Message) {
            self.enter("message");
            if let Some(session) = self.session.get() {
                session.close();
            }
            self.events.lock().unwrap().push("message-returned");
            self.exit();
        }
        fn on_disconnect(&self) {
            self.enter("disconnect");
            self.exit();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn close_inside_on_message_is_delivered_after_it_returns() {
        let observer = Arc::new(CloseOnReply::default());
        let session = ChatSession::open(
            ChatOptions {
                seed_welcome: false,
                ..Default::default()
            },
            latency(100, 5000),
            observer.clone(),
        );
        let _ = observer.session.set(session.clone());

        let outcome = session.submit("weather today?").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert!(session.is_closed());
        assert_eq!(observer.max_depth.load(Ordering::SeqCst), 1);
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec!["connect", "message", "message-returned", "disconnect"]
        );

        // Closed from the callback: later submissions are rejected.
        let outcome = session.submit("again").await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected(RejectReason::Closed));
    }
}
