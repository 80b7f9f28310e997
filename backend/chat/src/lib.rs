//! `weatherwise-chat`: the simulated text assistant.
//!
//! - [`LatencySimulator`]: randomized delay raced against a hard timeout
//! - [`responder`]: keyword intent classification and canned replies
//! - [`ChatSession`]: one request/response exchange at a time over a message log

pub mod latency;
pub mod responder;
pub mod session;

pub use latency::LatencySimulator;
pub use responder::{classify, reply_to, respond, Intent, ResponseTemplate};
pub use session::{ChatOptions, ChatSession, RejectReason, SubmitOutcome};
