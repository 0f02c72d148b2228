// SPDX-License-Identifier: MPL-2.0

//! Reshapes raw aggregate rows into chart-ready structures.
//!
//! Nothing here changes what a metric means: counts are only coerced to
//! numbers, long text is cut for display and the growth series gets its
//! running total.

use crate::analytics::types::{
    ContentRankingEntry, DailyEngagementPoint, DashboardView, DataSourceState, EngagementRow,
    NewUsersRow, RankingRow, SummarySnapshot, UserGrowthPoint, WeeklyComparison,
};
use unicode_segmentation::UnicodeSegmentation;

/// Raw results of one dashboard load cycle
#[derive(Debug, Clone)]
pub struct DashboardParts {
    pub summary: SummarySnapshot,
    pub weekly: WeeklyComparison,
    pub daily: Vec<EngagementRow>,
    pub ranking: Vec<RankingRow>,
    pub growth: Vec<NewUsersRow>,
}

/// Absent or null counts become 0
pub fn coerce(value: Option<i64>) -> i64 {
    value.unwrap_or(0)
}

/// Display title for a post: the first `max_len` characters of its content,
/// or `Post #<id>` when there is nothing to show
pub fn excerpt(content: Option<&str>, post_id: i64, max_len: usize) -> String {
    let content = content.unwrap_or_default();
    let cut: String = content.graphemes(true).take(max_len).collect();

    if cut.is_empty() {
        format!("Post #{}", post_id)
    } else {
        cut
    }
}

pub fn daily_points(rows: &[EngagementRow]) -> Vec<DailyEngagementPoint> {
    rows.iter()
        .map(|row| DailyEngagementPoint {
            date: row.date,
            likes: coerce(row.likes),
            comments: coerce(row.comments),
            shares: 0,
        })
        .collect()
}

pub fn ranking_entries(rows: &[RankingRow], excerpt_len: usize) -> Vec<ContentRankingEntry> {
    rows.iter()
        .map(|row| {
            let likes = coerce(row.likes);
            let comments = coerce(row.comments);

            ContentRankingEntry {
                post_id: row.post_id,
                author_username: row.username.clone().unwrap_or_default(),
                content_excerpt: excerpt(row.content.as_deref(), row.post_id, excerpt_len),
                likes,
                comments,
                engagement: likes + comments,
            }
        })
        .collect()
}

/// Running total of signups, left to right over ascending dates.
/// The first bucket seeds the total.
pub fn fold_user_growth(rows: &[NewUsersRow]) -> Vec<UserGrowthPoint> {
    rows.iter()
        .scan(0i64, |total, row| {
            let new_users = coerce(row.new_users);
            *total += new_users;
            Some(UserGrowthPoint {
                date: row.date,
                new_users,
                total_users: *total,
            })
        })
        .collect()
}

/// Fold a complete, successful load cycle into a live view
pub fn assemble(parts: DashboardParts, excerpt_len: usize) -> DashboardView {
    DashboardView {
        summary: parts.summary,
        weekly_comparison: parts.weekly,
        daily_engagement: daily_points(&parts.daily),
        content_ranking: ranking_entries(&parts.ranking, excerpt_len),
        user_growth: fold_user_growth(&parts.growth),
        data_source_state: DataSourceState::Live,
    }
}
