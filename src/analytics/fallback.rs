// SPDX-License-Identifier: MPL-2.0

//! Built-in placeholder dataset shown when a load cycle cannot complete.

use crate::analytics::types::{
    ContentRankingEntry, DailyEngagementPoint, DashboardView, DataSourceState, SummarySnapshot,
    UserGrowthPoint, WeeklyComparison, engagement_rate,
};
use chrono::NaiveDate;

const DAILY: &[(u32, i64, i64)] = &[
    (1, 245, 67),
    (2, 312, 89),
    (3, 287, 72),
    (4, 356, 94),
    (5, 298, 81),
    (6, 402, 115),
    (7, 378, 103),
];

const TOP_POSTS: &[(i64, &str, &str, i64, i64)] = &[
    (1, "jane_smith", "Just launched our new product ", 1250, 89),
    (2, "mike_wilson", "Behind the scenes of today's p", 980, 67),
    (3, "sarah_jones", "Tips for staying productive wh", 856, 124),
    (4, "john_doe", "What's your favorite weekend a", 743, 201),
    (5, "alex_brown", "Throwback to last summer's tea", 621, 45),
];

const GROWTH: &[(u32, i64)] = &[(1, 120), (2, 98), (3, 143), (4, 110), (5, 167), (6, 134), (7, 152)];

/// The degraded view: fixed numbers, flagged as such
pub fn placeholder_view() -> DashboardView {
    let daily_engagement = DAILY
        .iter()
        .map(|&(day, likes, comments)| DailyEngagementPoint {
            date: placeholder_date(day),
            likes,
            comments,
            shares: 0,
        })
        .collect();

    let content_ranking = TOP_POSTS
        .iter()
        .map(|&(post_id, author, excerpt, likes, comments)| ContentRankingEntry {
            post_id,
            author_username: author.to_string(),
            content_excerpt: excerpt.to_string(),
            likes,
            comments,
            engagement: likes + comments,
        })
        .collect();

    let mut total_users = 11_770;
    let user_growth = GROWTH
        .iter()
        .map(|&(day, new_users)| {
            total_users += new_users;
            UserGrowthPoint {
                date: placeholder_date(day),
                new_users,
                total_users,
            }
        })
        .collect();

    DashboardView {
        summary: SummarySnapshot {
            total_users: 12_694,
            total_posts: 3_421,
            total_likes: 45_230,
            total_comments: 8_912,
            engagement_rate: engagement_rate(45_230, 8_912, 3_421),
        },
        weekly_comparison: WeeklyComparison {
            this_week: 2_897,
            last_week: 2_541,
        },
        daily_engagement,
        content_ranking,
        user_growth,
        data_source_state: DataSourceState::Degraded,
    }
}

fn placeholder_date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_flagged_degraded() {
        assert_eq!(placeholder_view().data_source_state, DataSourceState::Degraded);
    }

    #[test]
    fn test_placeholder_is_internally_consistent() {
        let view = placeholder_view();

        assert!(view.content_ranking.len() <= 100);
        assert!(
            view.content_ranking
                .windows(2)
                .all(|w| w[0].engagement >= w[1].engagement)
        );
        assert!(
            view.user_growth
                .windows(2)
                .all(|w| w[0].total_users <= w[1].total_users)
        );
        assert!(view.daily_engagement.windows(2).all(|w| w[0].date < w[1].date));
        assert!(view.content_ranking.iter().all(|e| e.content_excerpt.chars().count() <= 30));

        let summary = &view.summary;
        assert_eq!(
            summary.engagement_rate,
            engagement_rate(summary.total_likes, summary.total_comments, summary.total_posts)
        );
        assert_eq!(summary.engagement_rate, 1582.6);
    }

    #[test]
    fn test_placeholder_is_stable() {
        assert_eq!(placeholder_view(), placeholder_view());
    }
}
