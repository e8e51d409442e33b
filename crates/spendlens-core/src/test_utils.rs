//! Test utilities for spendlens-core
//!
//! This module provides a mock analytics API server that speaks the same
//! wire format as the real backend, for HTTP source and integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::models::{BudgetLine, Category, ExpenseRecord};
use crate::remote::{RemoteCluster, RemoteClustering, RemoteTrend};

/// Payloads served by `MockApiServer`
#[derive(Debug, Clone, Default)]
pub struct MockApiState {
    pub records: Vec<ExpenseRecord>,
    pub clustering: RemoteClustering,
    pub narrative: String,
    pub trend: RemoteTrend,
    pub budgets: Vec<BudgetLine>,
    /// When set, requests must carry exactly this Authorization value
    pub required_token: Option<String>,
    /// Answer clustering with an error envelope
    pub clustering_fails: bool,
    /// Serve bare JSON instead of `{code, data, msg}` envelopes
    pub bare: bool,
}

impl MockApiState {
    /// A small but complete data set
    pub fn sample() -> Self {
        let day = |m, d| NaiveDate::from_ymd_opt(2026, m, d).unwrap_or_default();
        Self {
            records: vec![
                ExpenseRecord::new(1, "Coffee House", 32.0)
                    .with_date(day(3, 2))
                    .with_category(Category::Dining),
                ExpenseRecord::new(2, "City Metro", 6.0)
                    .with_date(day(3, 3))
                    .with_category(Category::Transport),
                ExpenseRecord::new(3, "Paper Co", 148.0)
                    .with_date(day(3, 9))
                    .with_category(Category::OfficeSupplies),
                ExpenseRecord::new(4, "Mobile Carrier", 99.0)
                    .with_date(day(2, 28))
                    .with_category(Category::Telecom),
                ExpenseRecord::new(5, "Computer Store", 4299.0)
                    .with_date(day(2, 11))
                    .with_category(Category::Electronics),
                ExpenseRecord::new(6, "Noodle Bar", 45.5)
                    .with_date(day(1, 20))
                    .with_category(Category::Dining),
            ],
            clustering: RemoteClustering {
                clusters: vec![
                    RemoteCluster {
                        label: Some("Daily".to_string()),
                        count: Some(4),
                        avg_amount: Some(45.6),
                        description: None,
                    },
                    RemoteCluster {
                        label: Some("Equipment".to_string()),
                        count: Some(2),
                        avg_amount: Some(2223.5),
                        description: Some("Occasional hardware purchases".to_string()),
                    },
                ],
                k: Some(2),
                total_points: Some(6),
            },
            narrative: "Most spending is small and frequent.".to_string(),
            trend: RemoteTrend {
                months: vec!["2026-01".into(), "2026-02".into(), "2026-03".into()],
                amounts: vec![45.5, 4398.0, 186.0],
                forecast: Some(210.0),
                forecast_label: Some("2026-04 (预测)".into()),
            },
            budgets: vec![
                BudgetLine {
                    id: Some(1),
                    category: Some(Category::Dining),
                    limit_amount: 500.0,
                    used_amount: 77.5,
                },
                BudgetLine {
                    id: Some(2),
                    category: Some(Category::Electronics),
                    limit_amount: 3000.0,
                    used_amount: 4299.0,
                },
            ],
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    pub fn failing_clustering(mut self) -> Self {
        self.clustering_fails = true;
        self
    }

    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.required_token {
            None => true,
            Some(expected) => headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected),
        }
    }

    fn reply<T: Serialize>(&self, headers: &HeaderMap, data: &T) -> Response {
        if !self.authorized(headers) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"code": 401, "msg": "login expired"})),
            )
                .into_response();
        }
        let data = serde_json::to_value(data).unwrap_or(Value::Null);
        if self.bare {
            Json(data).into_response()
        } else {
            Json(json!({"code": 200, "data": data, "msg": "success"})).into_response()
        }
    }
}

type SharedState = Arc<MockApiState>;

/// Mock analytics API server for testing
pub struct MockApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockApiServer {
    /// Start the mock server on an available port
    pub async fn start(state: MockApiState) -> Self {
        let app = Router::new()
            .route("/api/doc/list", get(handle_records))
            .route("/api/stats/clustering", get(handle_clustering))
            .route("/api/stats/analyze-clustering", get(handle_narrative))
            .route("/api/stats/trend", get(handle_trend))
            .route("/api/budget/list", get(handle_budgets))
            .with_state(Arc::new(state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_records(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    state.reply(&headers, &state.records)
}

async fn handle_clustering(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if state.clustering_fails && state.authorized(&headers) {
        return Json(json!({"code": 500, "msg": "clustering service error"})).into_response();
    }
    state.reply(&headers, &state.clustering)
}

async fn handle_narrative(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    state.reply(&headers, &state.narrative)
}

async fn handle_trend(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    state.reply(&headers, &state.trend)
}

async fn handle_budgets(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    state.reply(&headers, &state.budgets)
}
