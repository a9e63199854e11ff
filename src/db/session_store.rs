use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::{
    error::StoreError,
    interview::SessionSnapshot,
    store::{SessionStore, SESSION_KEY},
};

use super::Database;

/// Keeps the snapshot as a JSON blob under [`SESSION_KEY`] in `kv_store`.
#[derive(Clone)]
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn read_raw(&self) -> anyhow::Result<Option<String>> {
        self.db
            .execute(|conn| {
                conn.query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![SESSION_KEY],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .context("failed to read session snapshot")
            })
            .await
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let serialized = snapshot.to_json()?;
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                    params![SESSION_KEY, serialized, Utc::now().to_rfc3339()],
                )
                .context("failed to write session snapshot")?;
                Ok(())
            })
            .await
            .map_err(StoreError::PersistenceUnavailable)
    }

    async fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        let raw = self
            .read_raw()
            .await
            .map_err(StoreError::PersistenceUnavailable)?;
        raw.as_deref().map(SessionSnapshot::from_json).transpose()
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.db
            .execute(|conn| {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", params![SESSION_KEY])
                    .context("failed to delete session snapshot")?;
                Ok(())
            })
            .await
            .map_err(StoreError::PersistenceUnavailable)
    }
}
