// SPDX-License-Identifier: MPL-2.0

mod db;
mod events;
mod logs;
mod schema;
mod seed;

pub use db::EventStore;
pub use events::EventLog;
pub use logs::{MetricEntry, MetricLog};
pub use schema::TIMESTAMP_FORMAT;
pub use seed::seed_demo;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be opened, stayed locked past the busy timeout,
    /// or the query was interrupted.
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(rusqlite::Error),
    #[error("database path error: {0}")]
    Path(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::OperationInterrupted
                | ErrorCode::NotADatabase,
            ) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Database(err),
        }
    }
}
