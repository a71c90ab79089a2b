use crate::config::ServerConfig;
use crate::error::Result;
use crate::server;
use crate::storage::{IssueStore, SqliteIssueStore};
use std::sync::Arc;
use tracing::info;

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the address cannot be
/// bound, or the server stops with an I/O error.
pub async fn execute(config: &ServerConfig) -> Result<()> {
    let store = SqliteIssueStore::open_with_timeout(&config.db_path, config.lock_timeout_ms)?;
    info!(db = %store.path().display(), issues = store.count()?, "Issue store ready");

    let store: Arc<dyn IssueStore> = Arc::new(store);
    server::serve(config, store).await
}
