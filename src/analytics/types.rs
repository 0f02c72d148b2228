// SPDX-License-Identifier: MPL-2.0

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Platform-wide totals, recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySnapshot {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    /// (likes + comments) per post as a percentage, one decimal place
    pub engagement_rate: f64,
}

impl SummarySnapshot {
    pub fn from_totals(users: i64, posts: i64, likes: i64, comments: i64) -> Self {
        Self {
            total_users: users,
            total_posts: posts,
            total_likes: likes,
            total_comments: comments,
            engagement_rate: engagement_rate(likes, comments, posts),
        }
    }
}

/// Likes + comments per post as a percentage, 0 when there are no posts
pub fn engagement_rate(likes: i64, comments: i64, posts: i64) -> f64 {
    if posts <= 0 {
        return 0.0;
    }
    round_one_decimal((likes + comments) as f64 / posts as f64 * 100.0)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Likes + comments in this week's window against the week before
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyComparison {
    pub this_week: i64,
    pub last_week: i64,
}

/// Body of the summary endpoint: totals plus the weekly comparison.
///
/// `weeklyEngagement` carries plain counts, `{"thisWeek": N, "lastWeek": N}`.
/// Older clients that read `thisWeek.likesAndComments` need updating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub totals: SummarySnapshot,
    pub weekly_engagement: WeeklyComparison,
}

/// One day of post activity as it comes out of the store.
/// Counts are `None` when the aggregate cell was null or not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRow {
    pub date: NaiveDate,
    pub posts: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
}

/// One post of the content ranking as it comes out of the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub post_id: i64,
    pub username: Option<String>,
    pub content: Option<String>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub engagement: Option<i64>,
    pub created_at: String,
}

/// Signups on one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUsersRow {
    pub date: NaiveDate,
    pub new_users: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEngagementPoint {
    pub date: NaiveDate,
    pub likes: i64,
    pub comments: i64,
    /// There is no share entity; always 0
    pub shares: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRankingEntry {
    pub post_id: i64,
    pub author_username: String,
    pub content_excerpt: String,
    pub likes: i64,
    pub comments: i64,
    pub engagement: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGrowthPoint {
    pub date: NaiveDate,
    pub new_users: i64,
    /// Running total seeded by the first bucket of the series
    pub total_users: i64,
}

/// Where the numbers in a dashboard view came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceState {
    Live,
    Degraded,
}

/// Everything the dashboard renders, in one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub summary: SummarySnapshot,
    pub weekly_comparison: WeeklyComparison,
    pub daily_engagement: Vec<DailyEngagementPoint>,
    pub content_ranking: Vec<ContentRankingEntry>,
    pub user_growth: Vec<UserGrowthPoint>,
    pub data_source_state: DataSourceState,
}
