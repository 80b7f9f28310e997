//! Serialized event delivery for session observers.
//!
//! Sessions push [`SessionEvent`]s into an [`EventDispatcher`] while holding
//! their own state lock (so queue order matches transition order) and flush
//! after releasing it. Only one frame drains the queue at a time. An event
//! raised from inside a callback is appended and picked up by the frame that
//! is already draining, so observers are never entered re-entrantly. A flush
//! from another thread blocks until the active drainer has emptied the queue,
//! so once `flush` returns every event queued before it has been delivered.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::debug;

use crate::error::SessionError;
use crate::event::SessionEvent;
use crate::message::Message;
use crate::traits::SessionObserver;
use crate::types::SessionHandle;

#[derive(Default)]
struct DispatchQueue {
    pending: VecDeque<SessionEvent>,
    /// Thread currently delivering events, if any.
    drainer: Option<ThreadId>,
}

pub struct EventDispatcher {
    observer: Arc<dyn SessionObserver>,
    queue: Mutex<DispatchQueue>,
    idle: Condvar,
}

impl EventDispatcher {
    pub fn new(observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            observer,
            queue: Mutex::new(DispatchQueue::default()),
            idle: Condvar::new(),
        }
    }

    /// Queue an event without delivering it.
    pub fn enqueue(&self, event: SessionEvent) {
        self.lock().pending.push_back(event);
    }

    /// Deliver queued events in order.
    ///
    /// Called from inside a callback, returns immediately: the outer frame
    /// on this thread delivers the new events after the callback returns.
    /// Called while another thread is draining, waits for that thread to
    /// finish and then drains whatever is left.
    pub fn flush(&self) {
        let me = thread::current().id();
        {
            let mut queue = self.lock();
            loop {
                let drainer = queue.drainer;
                match drainer {
                    Some(owner) if owner == me => return,
                    Some(_) => {
                        queue = self
                            .idle
                            .wait(queue)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    None => break,
                }
            }
            if queue.pending.is_empty() {
                return;
            }
            queue.drainer = Some(me);
        }
        let _reset = ResetOnUnwind(self);

        loop {
            let event = {
                let mut queue = self.lock();
                match queue.pending.pop_front() {
                    Some(event) => event,
                    None => {
                        queue.drainer = None;
                        self.idle.notify_all();
                        return;
                    }
                }
            };
            self.deliver(event);
        }
    }

    pub fn emit(&self, event: SessionEvent) {
        self.enqueue(event);
        self.flush();
    }

    /// Events queued but not yet delivered.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    fn deliver(&self, event: SessionEvent) {
        debug!(kind = %event.kind(), "Dispatching session event");
        match &event {
            SessionEvent::Connected(handle) => self.observer.on_connect(handle),
            SessionEvent::Disconnected => self.observer.on_disconnect(),
            SessionEvent::Message(message) => self.observer.on_message(message),
            SessionEvent::Error(error) => self.observer.on_error(error),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatchQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Releases the drainer slot if an observer panics mid-delivery.
struct ResetOnUnwind<'a>(&'a EventDispatcher);

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.lock().drainer = None;
            self.0.idle.notify_all();
        }
    }
}

// ---------------------------------------------------------------------------
// Closure-based observer
// ---------------------------------------------------------------------------

type ConnectFn = Box<dyn Fn(&SessionHandle) + Send + Sync>;
type DisconnectFn = Box<dyn Fn() + Send + Sync>;
type MessageFn = Box<dyn Fn(&Message) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&SessionError) + Send + Sync>;

/// A [`SessionObserver`] assembled from optional closures.
#[derive(Default)]
pub struct Callbacks {
    on_connect: Option<ConnectFn>,
    on_disconnect: Option<DisconnectFn>,
    on_message: Option<MessageFn>,
    on_error: Option<ErrorFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect(mut self, f: impl Fn(&SessionHandle) + Send + Sync + 'static) -> Self {
        self.on_connect = Some(Box::new(f));
        self
    }

    pub fn with_disconnect(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_disconnect = Some(Box::new(f));
        self
    }

    pub fn with_message(mut self, f: impl Fn(&Message) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Box::new(f));
        self
    }

    pub fn with_error(mut self, f: impl Fn(&SessionError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl SessionObserver for Callbacks {
    fn on_connect(&self, handle: &SessionHandle) {
        if let Some(f) = &self.on_connect {
            f(handle);
        }
    }

    fn on_disconnect(&self) {
        if let Some(f) = &self.on_disconnect {
            f();
        }
    }

    fn on_message(&self, message: &Message) {
        if let Some(f) = &self.on_message {
            f(message);
        }
    }

    fn on_error(&self, error: &SessionError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_connect", &self.on_connect.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .field("on_message", &self.on_message.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
