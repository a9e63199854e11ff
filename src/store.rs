//! Persistence port for the in-progress interview snapshot.
//!
//! The store is a passive single-key mapping: it never interprets the
//! snapshot beyond (de)serializing it. Eligibility and validation belong to
//! the session controller.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::{error::StoreError, interview::SessionSnapshot};

/// Key the snapshot lives under, shared by every backend.
pub const SESSION_KEY: &str = "interviewSession";

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;

    /// Returns `Ok(None)` when nothing is stored and `CorruptSnapshot` when
    /// the stored value does not parse.
    async fn load(&self) -> Result<Option<SessionSnapshot>, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store. Used for the `memory` backend and in tests, where the
/// raw value and availability can be manipulated directly.
#[derive(Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
    unavailable: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&self, value: impl Into<String>) {
        *self.lock_raw() = Some(value.into());
    }

    pub fn raw(&self) -> Option<String> {
        self.lock_raw().clone()
    }

    /// Makes every subsequent operation fail as if the backing storage were gone.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::PersistenceUnavailable(anyhow!(
                "storage for {SESSION_KEY} is unavailable"
            )))
        } else {
            Ok(())
        }
    }

    fn lock_raw(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        match self.raw.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.check_available()?;
        let serialized = snapshot.to_json()?;
        *self.lock_raw() = Some(serialized);
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        self.check_available()?;
        self.lock_raw()
            .as_deref()
            .map(SessionSnapshot::from_json)
            .transpose()
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_available()?;
        *self.lock_raw() = None;
        Ok(())
    }
}
