// SPDX-License-Identifier: MPL-2.0

mod dashboard;
mod engine;
mod fallback;
pub mod present;
mod types;
mod windows;

pub use dashboard::{AnalyticsSource, Dashboard, LoadError};
pub use engine::AggregationEngine;
pub use fallback::placeholder_view;
pub use types::{
    ContentRankingEntry, DailyEngagementPoint, DashboardView, DataSourceState, EngagementRow,
    NewUsersRow, RankingRow, SummaryReport, SummarySnapshot, UserGrowthPoint, WeeklyComparison,
};
pub use windows::{WeekWindows, Window};
