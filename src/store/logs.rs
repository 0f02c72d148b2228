// SPDX-License-Identifier: MPL-2.0

use crate::store::{EventStore, StoreError};
use rusqlite::params;

/// A validated operational log entry
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    pub metric_name: String,
    pub metric_value: Option<f64>,
    pub notes: Option<String>,
}

/// Append-only access to `analytics_logs`
pub struct MetricLog<'a> {
    store: &'a EventStore,
}

impl<'a> MetricLog<'a> {
    pub fn new(store: &'a EventStore) -> Self {
        Self { store }
    }

    /// Append an entry on behalf of `created_by`, returns the row id
    pub fn append(&self, entry: &MetricEntry, created_by: i64) -> Result<i64, StoreError> {
        let conn = self.store.writer()?;

        conn.execute(
            r#"
            INSERT INTO analytics_logs (metric_name, metric_value, notes, created_by)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![entry.metric_name, entry.metric_value, entry.notes, created_by],
        )?;

        Ok(conn.last_insert_rowid())
    }
}
