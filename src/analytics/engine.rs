// SPDX-License-Identifier: MPL-2.0

use crate::analytics::types::{
    EngagementRow, NewUsersRow, RankingRow, SummaryReport, SummarySnapshot, WeeklyComparison,
};
use crate::analytics::windows::WeekWindows;
use crate::store::{EventStore, StoreError};
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row, params};
use tracing::debug;

/// Read-only aggregation queries over the event store.
///
/// Every call opens its own connection and either returns a complete result
/// or an error; there are no partial results.
#[derive(Clone, Debug)]
pub struct AggregationEngine {
    store: EventStore,
}

impl AggregationEngine {
    pub fn new(store: EventStore) -> Self {
        Self { store }
    }

    /// Platform totals and engagement rate
    pub fn compute_summary(&self) -> Result<SummarySnapshot, StoreError> {
        let conn = self.store.reader()?;

        let users = count(&conn, "SELECT COUNT(*) FROM users")?;
        let posts = count(&conn, "SELECT COUNT(*) FROM posts")?;
        let likes = count(&conn, "SELECT COUNT(*) FROM likes")?;
        let comments = count(&conn, "SELECT COUNT(*) FROM comments")?;

        Ok(SummarySnapshot::from_totals(users, posts, likes, comments))
    }

    /// Likes + comments in the week ending on `now`'s day and the week before
    pub fn compute_weekly_comparison(
        &self,
        now: DateTime<Utc>,
    ) -> Result<WeeklyComparison, StoreError> {
        let conn = self.store.reader()?;
        let windows = WeekWindows::ending_at(now);

        let mut stmt = conn.prepare(
            r#"
            SELECT
                (SELECT COUNT(*) FROM likes WHERE created_at >= ?1 AND created_at < ?2)
                + (SELECT COUNT(*) FROM comments WHERE created_at >= ?1 AND created_at < ?2)
            "#,
        )?;

        let mut in_window = |start: String, end: String| -> Result<i64, StoreError> {
            let total = stmt.query_row(params![start, end], |row| {
                Ok(read_count(row, 0, "engagement"))
            })?;
            Ok(total.unwrap_or(0))
        };

        let this_week = in_window(
            windows.this_week.start_timestamp(),
            windows.this_week.end_timestamp(),
        )?;
        let last_week = in_window(
            windows.last_week.start_timestamp(),
            windows.last_week.end_timestamp(),
        )?;

        Ok(WeeklyComparison {
            this_week,
            last_week,
        })
    }

    /// Summary and weekly comparison together, as the summary endpoint serves them
    pub fn compute_summary_report(&self, now: DateTime<Utc>) -> Result<SummaryReport, StoreError> {
        Ok(SummaryReport {
            totals: self.compute_summary()?,
            weekly_engagement: self.compute_weekly_comparison(now)?,
        })
    }

    /// Per-day likes and comments on the posts created that day, oldest first
    pub fn compute_daily_engagement(&self) -> Result<Vec<EngagementRow>, StoreError> {
        let conn = self.store.reader()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                DATE(p.created_at) AS date,
                COUNT(p.id) AS posts,
                COALESCE(SUM(COALESCE(l.likes_count, 0)), 0) AS likes,
                COALESCE(SUM(COALESCE(c.comments_count, 0)), 0) AS comments
            FROM posts p
            LEFT JOIN post_likes_agg l ON l.post_id = p.id
            LEFT JOIN post_comments_agg c ON c.post_id = p.id
            GROUP BY DATE(p.created_at)
            ORDER BY date ASC
            "#,
        )?;

        let mut rows = stmt.query([])?;
        let mut days = Vec::new();

        while let Some(row) = rows.next()? {
            days.push(EngagementRow {
                date: row.get(0)?,
                posts: read_count(row, 1, "posts"),
                likes: read_count(row, 2, "likes"),
                comments: read_count(row, 3, "comments"),
            });
        }

        Ok(days)
    }

    /// Posts ranked by likes + comments, newest first among equals
    pub fn compute_content_ranking(&self, limit: usize) -> Result<Vec<RankingRow>, StoreError> {
        let conn = self.store.reader()?;

        // post id is the last key so identical timestamps still order stably
        let mut stmt = conn.prepare(
            r#"
            SELECT
                p.id, u.username, p.content,
                COALESCE(l.likes_count, 0) AS likes,
                COALESCE(c.comments_count, 0) AS comments,
                COALESCE(l.likes_count, 0) + COALESCE(c.comments_count, 0) AS engagement,
                p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            LEFT JOIN post_likes_agg l ON l.post_id = p.id
            LEFT JOIN post_comments_agg c ON c.post_id = p.id
            ORDER BY engagement DESC, p.created_at DESC, p.id DESC
            LIMIT ?
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = stmt.query([limit])?;
        let mut ranking = Vec::new();

        while let Some(row) = rows.next()? {
            ranking.push(RankingRow {
                post_id: row.get(0)?,
                username: row.get(1)?,
                content: row.get(2)?,
                likes: read_count(row, 3, "likes"),
                comments: read_count(row, 4, "comments"),
                engagement: read_count(row, 5, "engagement"),
                created_at: row.get(6)?,
            });
        }

        Ok(ranking)
    }

    /// Signups per calendar date, oldest first
    pub fn compute_user_growth(&self) -> Result<Vec<NewUsersRow>, StoreError> {
        let conn = self.store.reader()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT DATE(created_at) AS date, COUNT(id) AS new_users
            FROM users
            GROUP BY DATE(created_at)
            ORDER BY date ASC
            "#,
        )?;

        let mut rows = stmt.query([])?;
        let mut buckets = Vec::new();

        while let Some(row) = rows.next()? {
            buckets.push(NewUsersRow {
                date: row.get(0)?,
                new_users: read_count(row, 1, "new_users"),
            });
        }

        Ok(buckets)
    }
}

fn count(conn: &Connection, sql: &str) -> Result<i64, StoreError> {
    let total = conn.query_row(sql, [], |row| Ok(read_count(row, 0, "count")))?;
    Ok(total.unwrap_or(0))
}

/// Read an aggregate cell as a count.
///
/// Nulls (outer joins against sparse side tables) and non-numeric cells come
/// back as `None` instead of failing the whole query.
fn read_count(row: &Row<'_>, idx: usize, column: &str) -> Option<i64> {
    match row.get_ref(idx) {
        Ok(ValueRef::Integer(n)) => Some(n),
        Ok(ValueRef::Real(f)) if f.is_finite() => Some(f as i64),
        Ok(ValueRef::Text(text)) => {
            let parsed = std::str::from_utf8(text)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|f| f.is_finite())
                .map(|f| f as i64);
            if parsed.is_none() {
                debug!("Malformed aggregate cell in column {}, treating as 0", column);
            }
            parsed
        }
        Ok(ValueRef::Null) => None,
        Ok(_) | Err(_) => {
            debug!("Malformed aggregate cell in column {}, treating as 0", column);
            None
        }
    }
}
