pub mod session;

pub use session::{StartParams, VoiceSession, VoiceSettings, VoiceSnapshot, GREETING};
