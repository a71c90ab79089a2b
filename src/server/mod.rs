//! HTTP endpoint layer.
//!
//! One collection resource, `/issues/`, supporting list (`GET`) and create
//! (`POST`). The root path redirects to the static landing page, which is
//! served from the configured directory under `/static`.

pub mod error;
pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::storage::IssueStore;

pub use error::ApiError;
pub use handlers::{MessageResponse, create_issue, index, list_issues};

/// Shared handler state. Holds no per-request mutable data.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IssueStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }
}

/// Build the application router.
pub fn app_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/issues/", get(list_issues).post(create_issue))
        .route("/issues", get(list_issues).post(create_issue));

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &ServerConfig, store: Arc<dyn IssueStore>) -> Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, db = %config.db_path.display(), "Listening");

    if let Some(dir) = config.static_dir.as_deref().filter(|dir| !dir.is_dir()) {
        warn!(dir = %dir.display(), "Static directory not found; /static will return 404");
    }

    let app = app_router(AppState::new(store), config.static_dir.as_deref());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
