use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// `PRAGMA user_version` stamped on databases created by this build.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates `kv_store` on a blank file and stamps it. Files stamped by a newer
/// build are refused rather than read with the wrong layout.
pub fn ensure_schema(conn: &mut Connection) -> Result<()> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    match version {
        SCHEMA_VERSION => Ok(()),
        0 => {
            let tx = conn
                .transaction()
                .context("failed to open schema transaction")?;
            tx.execute_batch(include_str!("schemas/schema_v1.sql"))
                .context("failed to create session tables")?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)
                .context("failed to stamp user_version")?;
            tx.commit().context("failed to commit session schema")
        }
        other => bail!(
            "session database has schema version {other}, this build only reads version {SCHEMA_VERSION}"
        ),
    }
}
