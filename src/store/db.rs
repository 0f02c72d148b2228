// SPDX-License-Identifier: MPL-2.0

use crate::store::StoreError;
use crate::store::schema::{SCHEMA, TIMESTAMP_FORMAT};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Handle to the event store database.
///
/// Holds no open connection: every query opens its own, so the aggregation
/// calls of one dashboard load never wait on each other.
#[derive(Clone, Debug)]
pub struct EventStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl EventStore {
    /// Open or create the database at `path` and run migrations
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Path(format!("failed to create data dir: {}", e)))?;
        }

        let store = Self { path, busy_timeout };
        let conn = store.writer()?;
        Self::migrate(&conn)?;

        Ok(store)
    }

    /// Handle to an existing database, without creating or migrating it.
    /// Queries fail with [`StoreError::Unavailable`] if the file is missing.
    pub fn attach(path: impl AsRef<Path>, busy_timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout,
        }
    }

    /// Run schema migrations
    fn migrate(conn: &Connection) -> Result<(), StoreError> {
        // Execute the schema (all CREATE IF NOT EXISTS)
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Default location: ~/.local/share/pulse/pulse.db
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StoreError::Path("could not find data directory".to_string()))?;

        Ok(data_dir.join("pulse").join("pulse.db"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only connection for aggregation queries
    pub fn reader(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Read-write connection for migrations, seeding and the metric log
    pub fn writer(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Render an instant the way `created_at` columns store it
    pub fn timestamp(at: DateTime<Utc>) -> String {
        at.format(TIMESTAMP_FORMAT).to_string()
    }
}
