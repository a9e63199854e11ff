use thiserror::Error;

/// Contract violations on the question countdown. These indicate a bug in the
/// caller, so they are never swallowed by the session controller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    #[error("timer duration must be positive, got {0}s")]
    InvalidDuration(u32),
    #[error("timer activated before a duration was configured")]
    NotConfigured,
    #[error("timer already expired; configure a new duration before activating")]
    Expired,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted blob exists but cannot be used as a snapshot.
    #[error("persisted session is corrupt: {0}")]
    CorruptSnapshot(String),
    #[error("session store unavailable: {0}")]
    PersistenceUnavailable(#[source] anyhow::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::CorruptSnapshot(err.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::PersistenceUnavailable(anyhow::Error::new(err))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error("candidate data incomplete, missing: {}", .0.join(", "))]
    MissingCandidateFields(Vec<&'static str>),
    #[error("cannot begin an interview while {0}")]
    InvalidTransition(&'static str),
    #[error("session runtime has shut down")]
    RuntimeClosed,
}
