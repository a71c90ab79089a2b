use crate::config::ServerConfig;
use crate::error::Result;
use crate::storage::SqliteIssueStore;

/// Execute the init command.
///
/// Opening the store applies the schema; existing rows are left untouched.
///
/// # Errors
///
/// Returns an error if the database cannot be created or queried.
pub fn execute(config: &ServerConfig, quiet: bool) -> Result<()> {
    let store = SqliteIssueStore::open_with_timeout(&config.db_path, config.lock_timeout_ms)?;
    let count = store.count()?;

    if !quiet {
        println!(
            "Issue database ready at {} ({count} issue{})",
            store.path().display(),
            if count == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
