pub mod dispatch;
pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use dispatch::{Callbacks, EventDispatcher};
pub use error::SessionError;
pub use event::{EventKind, SessionEvent};
pub use message::{Message, MessageId, Recommendation, Role};
pub use traits::{
    DelayStrategy, FixedDelay, FixedLevel, LevelSampler, NoopObserver, RandomLevel,
    SessionObserver, UniformDelay,
};
pub use types::{
    AstronomyPicture, Coordinates, ForecastDay, SessionHandle, SessionStatus, WeatherReport,
};
