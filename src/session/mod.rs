pub mod controller;
pub mod runtime;

#[cfg(test)]
mod tests_controller;

pub use controller::{InterviewSession, SessionEvent, SessionOptions, SessionPhase, SessionView};
pub use runtime::{spawn_session, SessionHandle};
