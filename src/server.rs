//! HTTP surface built on axum.
//!
//! `GET /docs` runs the whole pipeline: fetch the pull request, summarise it,
//! optionally persist the summary, answer with JSON.

use crate::agent::{run_inference, AgentError, TextModel};
use crate::github::{GitHubError, PullRequestSource};
use crate::storage::{StoreOutcome, SummaryStore};
use crate::summary::{SummaryRecord, SummaryResponse};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{de, Deserialize, Deserializer};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared, read-only state handed to every request
pub struct AppState {
    pub github: Arc<dyn PullRequestSource>,
    pub model: Arc<dyn TextModel>,
    pub store: Arc<dyn SummaryStore>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Pull request not found")]
    NotFound,
    #[error("{0}")]
    InvalidQuery(String),
    #[error(transparent)]
    GitHub(#[from] GitHubError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidQuery(message) => (StatusCode::UNPROCESSABLE_ENTITY, message.clone()),
            AppError::GitHub(e) => {
                error!("Failed to fetch pull request: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch pull request".to_string(),
                )
            }
            AppError::Agent(e) => {
                error!("Model inference failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Model inference failed".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Query string of `GET /docs`
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub pr_number: i64,
    #[serde(deserialize_with = "lax_bool")]
    pub store_in_db: bool,
}

/// Accepts the usual truthy/falsy spellings, case-insensitively.
pub fn parse_lax_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn lax_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_lax_bool(&raw).ok_or_else(|| de::Error::custom(format!("invalid boolean: {:?}", raw)))
}

/// Result of one pass through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summarised {
    pub record: SummaryRecord,
    /// `None` when persistence was not requested
    pub store: Option<StoreOutcome>,
}

/// Fetch, summarise and optionally store a pull request.
///
/// A missing pull request short-circuits before the model or the store is touched.
/// A failed store is reported in the result, never as an error.
pub async fn summarise_pull_request(
    state: &AppState,
    pr_number: i64,
    store_in_db: bool,
) -> Result<Summarised, AppError> {
    // Fetch the pull request; a missing one ends the request here
    let pr = state
        .github
        .fetch_pull_request(pr_number)
        .await?
        .ok_or(AppError::NotFound)?;

    // Summarise title and body with the shared model
    let summary = run_inference(state.model.as_ref(), &pr).await?;
    let record = SummaryRecord::new(pr_number, summary);

    // Persist only on request; the outcome is already logged by the store
    let store = if store_in_db {
        Some(state.store.store_result(&record).await)
    } else {
        None
    };

    Ok(Summarised { record, store })
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::InvalidQuery(e.body_text()))?;

    let summarised = summarise_pull_request(&state, query.pr_number, query.store_in_db).await?;
    Ok(Json(summarised.record.into()))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "prsumma"
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/docs", get(get_summary))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Bind to `0.0.0.0:port` and serve until the process is stopped
pub async fn serve(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server listening on port {}", port);
    axum::serve(listener, router(state)).await
}
