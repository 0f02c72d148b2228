// SPDX-License-Identifier: MPL-2.0

use crate::store::{EventStore, StoreError};
use chrono::{DateTime, Utc};
use rusqlite::params;

/// Appends raw events (signups, posts, likes, comments).
///
/// The admin CRUD layer owns these tables in production; this writer exists
/// for seeding and for building fixtures.
pub struct EventLog<'a> {
    store: &'a EventStore,
}

impl<'a> EventLog<'a> {
    pub fn new(store: &'a EventStore) -> Self {
        Self { store }
    }

    /// Record a user signup, returns the new user id
    pub fn add_user(&self, username: &str, created_at: DateTime<Utc>) -> Result<i64, StoreError> {
        let conn = self.store.writer()?;

        conn.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            params![
                username,
                format!("{}@example.com", username),
                EventStore::timestamp(created_at)
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Record a post, returns the new post id
    pub fn add_post(
        &self,
        user_id: i64,
        content: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let conn = self.store.writer()?;

        conn.execute(
            "INSERT INTO posts (user_id, content, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, content, EventStore::timestamp(created_at)],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Record a like. A repeated like from the same user is ignored.
    pub fn add_like(
        &self,
        post_id: i64,
        user_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.store.writer()?;

        conn.execute(
            r#"
            INSERT INTO likes (post_id, user_id, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(post_id, user_id) DO NOTHING
            "#,
            params![post_id, user_id, EventStore::timestamp(created_at)],
        )?;

        Ok(())
    }

    /// Record a comment, returns the new comment id
    pub fn add_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let conn = self.store.writer()?;

        conn.execute(
            "INSERT INTO comments (post_id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![post_id, user_id, content, EventStore::timestamp(created_at)],
        )?;

        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_duplicate_like_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path().join("pulse.db"), Duration::from_millis(100)).unwrap();
        let events = EventLog::new(&store);
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();

        let alice = events.add_user("alice", at).unwrap();
        let post = events.add_post(alice, Some("hello"), at).unwrap();
        events.add_like(post, alice, at).unwrap();
        events.add_like(post, alice, at).unwrap();

        let likes: i64 = store
            .reader()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM likes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(likes, 1);
    }

    #[test]
    fn test_post_requires_existing_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path().join("pulse.db"), Duration::from_millis(100)).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();

        let result = EventLog::new(&store).add_post(42, Some("orphan"), at);
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
