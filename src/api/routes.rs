// SPDX-License-Identifier: MPL-2.0

use crate::analytics::{AggregationEngine, Dashboard};
use crate::api::{ApiError, Reply};
use crate::config::IS_DEVEL;
use crate::runtime;
use crate::state::{Authenticator, ServerSettings};
use crate::store::{EventStore, MetricEntry, MetricLog};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tiny_http::Method;
use tracing::{debug, warn};
use url::Url;

/// Everything a request handler needs
pub struct AppState {
    pub store: EventStore,
    pub engine: Arc<AggregationEngine>,
    pub dashboard: Dashboard<AggregationEngine>,
    pub auth: Authenticator,
    pub ranking_limit: usize,
}

impl AppState {
    pub fn new(store: EventStore, settings: &ServerSettings) -> Self {
        let engine = Arc::new(AggregationEngine::new(store.clone()));
        let dashboard = Dashboard::new(Arc::clone(&engine))
            .with_ranking_limit(settings.ranking_limit)
            .with_load_timeout(settings.load_timeout());

        Self {
            store,
            engine,
            dashboard,
            auth: Authenticator::new(settings.api_tokens.clone()),
            ranking_limit: settings.ranking_limit,
        }
    }
}

/// A request stripped down to what routing looks at
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path plus query string, as sent by the client
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl ApiRequest {
    pub fn get(url: &str) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            authorization: None,
            body: String::new(),
        }
    }
}

#[derive(Deserialize)]
struct MetricLogRequest {
    metric_name: Option<String>,
    metric_value: Option<f64>,
    notes: Option<String>,
}

pub fn dispatch(state: &AppState, request: &ApiRequest) -> Reply {
    let started = Instant::now();

    let reply = route(state, request).unwrap_or_else(|e| {
        if e.status() >= 500 {
            warn!("{} {} failed: {}", request.method, request.url, e);
        }
        e.into_reply()
    });

    debug!(
        "{} {} -> {} in {:?}",
        request.method,
        request.url,
        reply.status,
        started.elapsed()
    );

    reply
}

fn route(state: &AppState, request: &ApiRequest) -> Result<Reply, ApiError> {
    let url = Url::parse(&format!("http://localhost{}", request.url))
        .map_err(|e| ApiError::InvalidInput(format!("Bad request target: {}", e)))?;

    if request.method == Method::Options {
        return Ok(Reply::no_content());
    }

    match url.path() {
        "/health" => {
            expect_method(request, Method::Get)?;
            Ok(Reply::ok(serde_json::json!({
                "status": "ok",
                "env": if IS_DEVEL { "development" } else { "production" },
            })))
        }
        "/api/analytics/summary" => {
            read_access(state, request)?;
            Reply::json(200, &state.engine.compute_summary_report(Utc::now())?)
        }
        "/api/analytics/engagement" => {
            read_access(state, request)?;
            Reply::json(200, &state.engine.compute_daily_engagement()?)
        }
        "/api/analytics/content-performance" => {
            read_access(state, request)?;
            let limit = ranking_limit(&url, state.ranking_limit)?;
            Reply::json(200, &state.engine.compute_content_ranking(limit)?)
        }
        "/api/analytics/user-growth" => {
            read_access(state, request)?;
            Reply::json(200, &state.engine.compute_user_growth()?)
        }
        "/api/analytics/dashboard" => {
            read_access(state, request)?;
            let view = runtime::block_on(state.dashboard.load(Utc::now()));
            Reply::json(200, &view)
        }
        "/api/analytics/log" => {
            expect_method(request, Method::Post)?;
            append_metric(state, request)
        }
        _ => Err(ApiError::NotFound),
    }
}

fn expect_method(request: &ApiRequest, method: Method) -> Result<(), ApiError> {
    if request.method == method {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed)
    }
}

/// Read endpoints are open, but a token that is sent must be valid
fn read_access(state: &AppState, request: &ApiRequest) -> Result<(), ApiError> {
    expect_method(request, Method::Get)?;
    state.auth.identify(request.authorization.as_deref())?;
    Ok(())
}

/// `?limit=N`, capped at the configured maximum
fn ranking_limit(url: &Url, max: usize) -> Result<usize, ApiError> {
    let Some((_, raw)) = url.query_pairs().find(|(k, _)| k == "limit") else {
        return Ok(max);
    };

    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n.min(max)),
        _ => Err(ApiError::InvalidInput(format!(
            "limit must be a positive integer, got '{}'",
            raw
        ))),
    }
}

fn append_metric(state: &AppState, request: &ApiRequest) -> Result<Reply, ApiError> {
    let caller = state.auth.require(request.authorization.as_deref())?;

    let payload: MetricLogRequest = serde_json::from_str(&request.body)
        .map_err(|e| ApiError::InvalidInput(format!("Malformed payload: {}", e)))?;

    let metric_name = payload
        .metric_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("metric_name required".to_string()))?;

    let entry = MetricEntry {
        metric_name,
        metric_value: payload.metric_value,
        notes: payload.notes.filter(|n| !n.trim().is_empty()),
    };

    let id = MetricLog::new(&state.store).append(&entry, caller.user_id)?;
    debug!("User {} logged metric {} as #{}", caller.user_id, entry.metric_name, id);

    Ok(Reply {
        status: 201,
        body: serde_json::json!({ "id": id }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::placeholder_view;
    use crate::store::EventLog;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn fixture() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(
            dir.path().join("pulse.db"),
            std::time::Duration::from_millis(200),
        )
        .unwrap();
        let settings = ServerSettings {
            api_tokens: HashMap::from([("admin-token".to_string(), 1)]),
            ..ServerSettings::default()
        };
        (dir, AppState::new(store, &settings))
    }

    fn post_log(body: &str, token: Option<&str>) -> ApiRequest {
        ApiRequest {
            method: Method::Post,
            url: "/api/analytics/log".to_string(),
            authorization: token.map(|t| format!("Bearer {}", t)),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_health() {
        let (_dir, state) = fixture();
        let reply = dispatch(&state, &ApiRequest::get("/health"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["status"], "ok");
    }

    #[test]
    fn test_unknown_path_and_wrong_method() {
        let (_dir, state) = fixture();
        assert_eq!(dispatch(&state, &ApiRequest::get("/api/nope")).status, 404);
        assert_eq!(dispatch(&state, &ApiRequest::get("/api/analytics/log")).status, 405);
    }

    #[test]
    fn test_summary_shape() {
        let (_dir, state) = fixture();
        let reply = dispatch(&state, &ApiRequest::get("/api/analytics/summary"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["totals"]["totalPosts"], 0);
        assert_eq!(reply.body["totals"]["engagementRate"], 0.0);
        assert_eq!(reply.body["weeklyEngagement"]["thisWeek"], 0);
    }

    #[test]
    fn test_engagement_reports_zero_for_quiet_days() {
        let (_dir, state) = fixture();
        let events = EventLog::new(&state.store);
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let author = events.add_user("author", at).unwrap();
        events.add_post(author, Some("nobody saw this"), at).unwrap();

        let reply = dispatch(&state, &ApiRequest::get("/api/analytics/engagement"));
        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.body,
            serde_json::json!([
                { "date": "2024-01-02", "posts": 1, "likes": 0, "comments": 0 }
            ])
        );
        assert!(reply.body.to_string().contains("\"likes\":0"));
    }

    #[test]
    fn test_invalid_token_on_read_endpoint() {
        let (_dir, state) = fixture();
        let mut request = ApiRequest::get("/api/analytics/engagement");
        request.authorization = Some("Bearer forged".to_string());
        let reply = dispatch(&state, &request);
        assert_eq!(reply.status, 401);
        assert_eq!(reply.body["message"], "Invalid token");
    }

    #[test]
    fn test_content_performance_limit() {
        let (_dir, state) = fixture();
        let events = EventLog::new(&state.store);
        let now = Utc::now();
        let author = events.add_user("author", now).unwrap();
        for i in 0..3 {
            events.add_post(author, Some(&format!("post {}", i)), now).unwrap();
        }

        let reply = dispatch(&state, &ApiRequest::get("/api/analytics/content-performance?limit=2"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.as_array().unwrap().len(), 2);

        let bad = dispatch(&state, &ApiRequest::get("/api/analytics/content-performance?limit=zero"));
        assert_eq!(bad.status, 400);
    }

    #[test]
    fn test_dashboard_is_live_on_healthy_store() {
        let (_dir, state) = fixture();
        let reply = dispatch(&state, &ApiRequest::get("/api/analytics/dashboard"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["dataSourceState"], "live");
    }

    #[test]
    fn test_dashboard_degrades_when_store_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::attach(dir.path().join("gone.db"), std::time::Duration::from_millis(50));
        let state = AppState::new(store, &ServerSettings::default());

        let reply = dispatch(&state, &ApiRequest::get("/api/analytics/dashboard"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, serde_json::to_value(placeholder_view()).unwrap());

        // the raw endpoints report the outage instead
        let raw = dispatch(&state, &ApiRequest::get("/api/analytics/user-growth"));
        assert_eq!(raw.status, 503);
    }

    #[test]
    fn test_log_requires_token() {
        let (_dir, state) = fixture();
        let reply = dispatch(&state, &post_log(r#"{"metric_name":"reach"}"#, None));
        assert_eq!(reply.status, 401);
        assert_eq!(reply.body["message"], "Missing token");
    }

    #[test]
    fn test_log_requires_metric_name() {
        let (_dir, state) = fixture();
        for body in [r#"{}"#, r#"{"metric_name":"  "}"#, r#"{"metric_value":3}"#] {
            let reply = dispatch(&state, &post_log(body, Some("admin-token")));
            assert_eq!(reply.status, 400);
            assert_eq!(reply.body["message"], "metric_name required");
        }

        let malformed = dispatch(&state, &post_log("{", Some("admin-token")));
        assert_eq!(malformed.status, 400);
    }

    #[test]
    fn test_log_appends_entry() {
        let (_dir, state) = fixture();
        let reply = dispatch(
            &state,
            &post_log(
                r#"{"metric_name":"campaign_reach","metric_value":1520.5,"notes":"spring push"}"#,
                Some("admin-token"),
            ),
        );
        assert_eq!(reply.status, 201);
        let id = reply.body["id"].as_i64().unwrap();

        let (name, created_by): (String, i64) = state
            .store
            .reader()
            .unwrap()
            .query_row(
                "SELECT metric_name, created_by FROM analytics_logs WHERE id = ?",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(name, "campaign_reach");
        assert_eq!(created_by, 1);
    }

    #[test]
    fn test_preflight() {
        let (_dir, state) = fixture();
        let mut request = ApiRequest::get("/api/analytics/log");
        request.method = Method::Options;
        assert_eq!(dispatch(&state, &request).status, 204);
    }
}
