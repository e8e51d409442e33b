//! HTTP source for the remote expense API
//!
//! The server answers in several shapes: a `{code, data, msg}` envelope,
//! a bare array, a bare object or a bare string. `Envelope` folds all of
//! them into one typed result before anything reaches the analytics code.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::models::{BudgetLine, ExpenseRecord};
use crate::session::SessionHandle;

use super::types::{RemoteClustering, RemoteTrend};
use super::AnalyticsSource;

const RECORDS_PATH: &str = "/api/doc/list";
const CLUSTERING_PATH: &str = "/api/stats/clustering";
const NARRATIVE_PATH: &str = "/api/stats/analyze-clustering";
const TREND_PATH: &str = "/api/stats/trend";
const BUDGETS_PATH: &str = "/api/budget/list";

/// Envelope code meaning success
const CODE_OK: i64 = 200;
/// Envelope code for an expired or missing session
const CODE_UNAUTHORIZED: i64 = 401;

/// Response body as sent by the server
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped {
        code: i64,
        data: Option<T>,
        #[serde(default)]
        msg: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_result(self, path: &str) -> Result<T> {
        match self {
            Envelope::Bare(value) => Ok(value),
            Envelope::Wrapped {
                code: CODE_OK,
                data: Some(value),
                ..
            } => Ok(value),
            Envelope::Wrapped {
                code: CODE_OK,
                data: None,
                ..
            } => Err(Error::MalformedRemoteResult(format!(
                "{} returned no data",
                path
            ))),
            Envelope::Wrapped {
                code: CODE_UNAUTHORIZED,
                ..
            } => {
                warn!(path, "Session expired according to remote API");
                Err(Error::RemoteUnavailable(format!(
                    "{} rejected the session credential",
                    path
                )))
            }
            Envelope::Wrapped { code, msg, .. } => Err(Error::RemoteUnavailable(format!(
                "{} returned code {}: {}",
                path,
                code,
                msg.unwrap_or_default()
            ))),
        }
    }
}

/// reqwest-backed source
#[derive(Clone)]
pub struct HttpSource {
    http_client: Client,
    base_url: String,
    session: SessionHandle,
}

impl HttpSource {
    pub fn new(config: &RemoteConfig, session: SessionHandle) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.session.credential().ok_or_else(|| {
            Error::RemoteUnavailable(format!("no session credential for {}", path))
        })?;

        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            // The server expects the raw token, no scheme prefix
            .header(AUTHORIZATION, token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "Session rejected by remote API");
            return Err(Error::RemoteUnavailable(format!(
                "{} rejected the session credential",
                path
            )));
        }
        if !status.is_success() {
            return Err(Error::RemoteUnavailable(format!(
                "{} returned HTTP {}",
                path, status
            )));
        }

        let body = response.text().await?;
        debug!(path, bytes = body.len(), "Remote response received");
        parse_body(path, &body)
    }
}

fn parse_body<T: DeserializeOwned>(path: &str, body: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        let truncated = if body.len() > 200 {
            format!("{}...", body.chars().take(200).collect::<String>())
        } else {
            body.to_string()
        };
        Error::MalformedRemoteResult(format!("{}: {} | Raw: {}", path, e, truncated))
    })?;
    envelope.into_result(path)
}

#[async_trait]
impl AnalyticsSource for HttpSource {
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>> {
        self.get(RECORDS_PATH).await
    }

    async fn fetch_clustering(&self) -> Result<RemoteClustering> {
        self.get(CLUSTERING_PATH).await
    }

    async fn fetch_clustering_narrative(&self) -> Result<String> {
        self.get(NARRATIVE_PATH).await
    }

    async fn fetch_trend(&self) -> Result<RemoteTrend> {
        self.get(TREND_PATH).await
    }

    async fn fetch_budgets(&self) -> Result<Vec<BudgetLine>> {
        self.get(BUDGETS_PATH).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
