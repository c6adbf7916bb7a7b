pub mod engine;
pub mod events;

pub use engine::{TimerEngine, TimerEngineError};
pub use events::{TimerEvent, TimerEventType};
