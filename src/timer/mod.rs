pub mod controller;
pub mod state;

pub use controller::{QuestionTimer, TimerEvent, TimerSnapshot};
pub use state::{format_clock, TickOutcome, TimerState, TimerStatus, Urgency};
