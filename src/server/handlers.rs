use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Redirect;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{IssueError, Result};
use crate::model::Issue;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::validation::IssueValidator;

/// Landing page the root path redirects to.
pub const INDEX_PATH: &str = "/static/index.html";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn success() -> Self {
        Self { message: "Success" }
    }
}

/// `GET /issues/`: every issue, newest first.
pub async fn list_issues(State(state): State<AppState>) -> std::result::Result<Json<Vec<Issue>>, ApiError> {
    let store = Arc::clone(&state.store);
    let issues = run_blocking(move || store.list_all()).await?;
    debug!(count = issues.len(), "Serving issue list");
    Ok(Json(issues))
}

/// `POST /issues/`: validate strictly, then persist one issue.
pub async fn create_issue(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> std::result::Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::from_rejection(&rejection))?;

    let issue = IssueValidator::validate_payload(&payload)
        .map_err(|errors| ApiError::from(IssueError::from_validation_errors(errors)))?;

    let store = Arc::clone(&state.store);
    let id = run_blocking(move || store.create(&issue)).await?;
    debug!(id = %id, "Create request stored");

    Ok(Json(MessageResponse::success()))
}

/// `GET /`: send browsers to the static landing page.
pub async fn index() -> Redirect {
    Redirect::to(INDEX_PATH)
}

/// Run a store operation on the blocking pool.
async fn run_blocking<T, F>(op: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| ApiError::task_failed(&e))?
        .map_err(ApiError::from)
}
