// SPDX-License-Identifier: MPL-2.0

//! One dashboard load cycle: four aggregation calls in parallel, folded into
//! a single view, or the placeholder view if anything goes wrong.

use crate::analytics::engine::AggregationEngine;
use crate::analytics::fallback::placeholder_view;
use crate::analytics::present::{DashboardParts, assemble};
use crate::analytics::types::{DashboardView, EngagementRow, NewUsersRow, RankingRow, SummaryReport};
use crate::config::{DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_RANKING_LIMIT, EXCERPT_LEN};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// The four independent queries behind a dashboard load
pub trait AnalyticsSource: Send + Sync + 'static {
    fn summary(&self, now: DateTime<Utc>) -> Result<SummaryReport, StoreError>;
    fn daily_engagement(&self) -> Result<Vec<EngagementRow>, StoreError>;
    fn content_ranking(&self, limit: usize) -> Result<Vec<RankingRow>, StoreError>;
    fn user_growth(&self) -> Result<Vec<NewUsersRow>, StoreError>;
}

impl AnalyticsSource for AggregationEngine {
    fn summary(&self, now: DateTime<Utc>) -> Result<SummaryReport, StoreError> {
        self.compute_summary_report(now)
    }

    fn daily_engagement(&self) -> Result<Vec<EngagementRow>, StoreError> {
        self.compute_daily_engagement()
    }

    fn content_ranking(&self, limit: usize) -> Result<Vec<RankingRow>, StoreError> {
        self.compute_content_ranking(limit)
    }

    fn user_growth(&self) -> Result<Vec<NewUsersRow>, StoreError> {
        self.compute_user_growth()
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("aggregation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("load cycle timed out after {0:?}")]
    TimedOut(Duration),
}

/// Builds dashboard views from an [`AnalyticsSource`]
pub struct Dashboard<S> {
    source: Arc<S>,
    ranking_limit: usize,
    excerpt_len: usize,
    load_timeout: Duration,
}

impl<S> Clone for Dashboard<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            ranking_limit: self.ranking_limit,
            excerpt_len: self.excerpt_len,
            load_timeout: self.load_timeout,
        }
    }
}

impl<S: AnalyticsSource> Dashboard<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            ranking_limit: DEFAULT_RANKING_LIMIT,
            excerpt_len: EXCERPT_LEN,
            load_timeout: Duration::from_millis(DEFAULT_LOAD_TIMEOUT_MS),
        }
    }

    pub fn with_ranking_limit(mut self, limit: usize) -> Self {
        self.ranking_limit = limit;
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Run one load cycle. Always produces a view: a live one when all four
    /// queries succeed, the placeholder otherwise.
    pub async fn load(&self, now: DateTime<Utc>) -> DashboardView {
        match self.load_live(now).await {
            Ok(view) => view,
            Err(e) => {
                warn!("Dashboard load failed, serving placeholder data: {}", e);
                placeholder_view()
            }
        }
    }

    /// All-or-nothing: the first failure abandons the cycle
    pub async fn load_live(&self, now: DateTime<Utc>) -> Result<DashboardView, LoadError> {
        let source = &self.source;
        let limit = self.ranking_limit;

        let summary = run(Arc::clone(source), move |s| s.summary(now));
        let daily = run(Arc::clone(source), |s| s.daily_engagement());
        let ranking = run(Arc::clone(source), move |s| s.content_ranking(limit));
        let growth = run(Arc::clone(source), |s| s.user_growth());

        let joined = async { tokio::try_join!(summary, daily, ranking, growth) };
        let (summary, daily, ranking, growth) = tokio::time::timeout(self.load_timeout, joined)
            .await
            .map_err(|_| LoadError::TimedOut(self.load_timeout))??;

        debug!(
            "Dashboard loaded: {} days, {} ranked posts, {} growth buckets",
            daily.len(),
            ranking.len(),
            growth.len()
        );

        let parts = DashboardParts {
            summary: summary.totals,
            weekly: summary.weekly_engagement,
            daily,
            ranking,
            growth,
        };

        Ok(assemble(parts, self.excerpt_len))
    }
}

/// Start a query on the blocking pool right away; the returned future only
/// collects its result.
fn run<S, T, F>(
    source: Arc<S>,
    query: F,
) -> impl Future<Output = Result<T, LoadError>> + Send + 'static
where
    S: AnalyticsSource,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T, StoreError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(move || query(&source));
    async move { Ok(handle.await??) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::{DataSourceState, SummarySnapshot, WeeklyComparison};
    use chrono::{NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy, PartialEq)]
    enum Call {
        Summary,
        Daily,
        Ranking,
        Growth,
    }

    struct FakeSource {
        fail_on: Option<Call>,
        stall_on: Option<Call>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(fail_on: Option<Call>) -> Self {
            Self {
                fail_on,
                stall_on: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn enter(&self, call: Call) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.stall_on == Some(call) {
                std::thread::sleep(Duration::from_millis(300));
            }
            if self.fail_on == Some(call) {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    impl AnalyticsSource for FakeSource {
        fn summary(&self, _now: DateTime<Utc>) -> Result<SummaryReport, StoreError> {
            self.enter(Call::Summary)?;
            Ok(SummaryReport {
                totals: SummarySnapshot::from_totals(3, 2, 3, 1),
                weekly_engagement: WeeklyComparison {
                    this_week: 4,
                    last_week: 0,
                },
            })
        }

        fn daily_engagement(&self) -> Result<Vec<EngagementRow>, StoreError> {
            self.enter(Call::Daily)?;
            Ok(vec![EngagementRow {
                date: day(2),
                posts: Some(2),
                likes: Some(3),
                comments: Some(1),
            }])
        }

        fn content_ranking(&self, limit: usize) -> Result<Vec<RankingRow>, StoreError> {
            self.enter(Call::Ranking)?;
            let rows = (1..=5)
                .map(|id| RankingRow {
                    post_id: id,
                    username: Some("jane".to_string()),
                    content: None,
                    likes: Some(10 - id),
                    comments: Some(0),
                    engagement: Some(10 - id),
                    created_at: "2024-01-02 10:00:00".to_string(),
                })
                .take(limit)
                .collect();
            Ok(rows)
        }

        fn user_growth(&self) -> Result<Vec<NewUsersRow>, StoreError> {
            self.enter(Call::Growth)?;
            Ok(vec![
                NewUsersRow {
                    date: day(1),
                    new_users: Some(3),
                },
                NewUsersRow {
                    date: day(2),
                    new_users: Some(0),
                },
                NewUsersRow {
                    date: day(3),
                    new_users: Some(2),
                },
            ])
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_live_load_uses_all_four_queries() {
        let source = Arc::new(FakeSource::new(None));
        let view = Dashboard::new(Arc::clone(&source)).load(now()).await;

        assert_eq!(view.data_source_state, DataSourceState::Live);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        assert_eq!(view.summary.engagement_rate, 200.0);
        assert_eq!(view.weekly_comparison.this_week, 4);
        assert_eq!(view.daily_engagement[0].likes, 3);
        assert_eq!(view.content_ranking.len(), 5);
        assert_eq!(view.content_ranking[0].content_excerpt, "Post #1");
        let totals: Vec<i64> = view.user_growth.iter().map(|p| p.total_users).collect();
        assert_eq!(totals, vec![3, 3, 5]);
    }

    #[tokio::test]
    async fn test_ranking_failure_degrades_everything() {
        let source = Arc::new(FakeSource::new(Some(Call::Ranking)));
        let view = Dashboard::new(source).load(now()).await;

        assert_eq!(view.data_source_state, DataSourceState::Degraded);
        // not a single live number survives
        assert_eq!(view, placeholder_view());
    }

    #[tokio::test]
    async fn test_any_single_failure_degrades() {
        for call in [Call::Summary, Call::Daily, Call::Ranking, Call::Growth] {
            let source = Arc::new(FakeSource::new(Some(call)));
            let view = Dashboard::new(source).load(now()).await;
            assert_eq!(view, placeholder_view());
        }
    }

    #[tokio::test]
    async fn test_load_live_reports_the_failure() {
        let source = Arc::new(FakeSource::new(Some(Call::Growth)));
        let err = Dashboard::new(source).load_live(now()).await.unwrap_err();
        assert!(matches!(err, LoadError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_ranking_limit_is_passed_through() {
        let source = Arc::new(FakeSource::new(None));
        let view = Dashboard::new(source)
            .with_ranking_limit(2)
            .load(now())
            .await;
        assert_eq!(view.content_ranking.len(), 2);
    }

    #[tokio::test]
    async fn test_stalled_cycle_times_out() {
        let source = Arc::new(FakeSource {
            fail_on: None,
            stall_on: Some(Call::Daily),
            calls: AtomicUsize::new(0),
        });
        let dashboard = Dashboard::new(source).with_load_timeout(Duration::from_millis(20));

        let err = dashboard.load_live(now()).await.unwrap_err();
        assert!(matches!(err, LoadError::TimedOut(_)));
        assert_eq!(dashboard.load(now()).await, placeholder_view());
    }

    #[tokio::test]
    async fn test_next_cycle_starts_live_again() {
        let failing = Dashboard::new(Arc::new(FakeSource::new(Some(Call::Summary))));
        assert_eq!(
            failing.load(now()).await.data_source_state,
            DataSourceState::Degraded
        );

        let healthy = Dashboard::new(Arc::new(FakeSource::new(None)));
        assert_eq!(
            healthy.load(now()).await.data_source_state,
            DataSourceState::Live
        );
    }
}
