use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::error::{IssueError, StructuredError};

/// An error on its way to becoming an HTTP response.
///
/// Validation problems are returned to the client in full. Everything else
/// is logged here and answered with a generic 500 body.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ApiError {
    status: StatusCode,
    #[source]
    error: IssueError,
}

impl ApiError {
    /// Status code this error will be answered with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The request body was not readable as JSON.
    ///
    /// Keeps the rejection's own status (400 for syntax errors, 415 for a
    /// missing JSON content type).
    #[must_use]
    pub fn from_rejection(rejection: &JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            error: IssueError::InvalidBody {
                reason: rejection.body_text(),
            },
        }
    }

    /// A blocking store task panicked or was cancelled.
    #[must_use]
    pub fn task_failed(err: &tokio::task::JoinError) -> Self {
        Self::from(IssueError::Other(anyhow::anyhow!("store task failed: {err}")))
    }
}

impl From<IssueError> for ApiError {
    fn from(error: IssueError) -> Self {
        let code = StructuredError::from_error(&error).code;
        let status = StatusCode::from_u16(code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let structured = StructuredError::from_error(&self.error);
        if self.status.is_server_error() {
            error!(code = structured.code.as_str(), error = %self.error, "Request failed");
        } else {
            warn!(status = self.status.as_u16(), error = %self.error, "Request rejected");
        }
        (self.status, Json(structured.redacted().to_body())).into_response()
    }
}
