//! `SQLite` storage implementation.

use crate::error::{IssueError, Result};
use crate::model::{Issue, NewIssue};
use crate::storage::IssueStore;
use crate::storage::schema::apply_schema;
use crate::util::IdGenerator;
use crate::validation::IssueValidator;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// SQLite-based issue store.
///
/// Holds no connection: every operation opens its own, runs one statement
/// and drops it before returning.
#[derive(Debug)]
pub struct SqliteIssueStore {
    path: PathBuf,
    lock_timeout: Option<Duration>,
    ids: IdGenerator,
}

impl SqliteIssueStore {
    /// Open the store at the given path, creating the file and table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open the store with an optional busy timeout (ms) applied to every connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IssueError::DatabaseUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let store = Self {
            path: path.to_path_buf(),
            lock_timeout: lock_timeout_ms.map(Duration::from_millis),
            ids: IdGenerator::new(),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored issues.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT count(*) FROM issues", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        if let Some(timeout) = self.lock_timeout {
            conn.busy_timeout(timeout)?;
        }
        Ok(conn)
    }
}

impl IssueStore for SqliteIssueStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        apply_schema(&conn)?;
        debug!(path = %self.path.display(), "Schema ready");
        Ok(())
    }

    fn create(&self, issue: &NewIssue) -> Result<String> {
        IssueValidator::validate(issue).map_err(IssueError::from_validation_errors)?;

        let id = self.ids.generate()?;
        let data = serde_json::to_string(issue)?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO issues (id, data) VALUES (?1, ?2)",
            rusqlite::params![id, data],
        )?;

        info!(id = %id, issue_type = %issue.issue_type, "Issue created");
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<Issue>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, data FROM issues ORDER BY id DESC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut issues = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for (id, data) in rows {
            match issue_from_row(id, &data) {
                Ok(issue) => issues.push(issue),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable issue row");
                    skipped += 1;
                }
            }
        }

        debug!(count = issues.len(), skipped, "Listed issues");
        Ok(issues)
    }
}

/// Map a stored `(id, data)` row into an `Issue`.
///
/// # Errors
///
/// Returns `IssueError::CorruptRecord` if `data` is not the JSON encoding of
/// exactly the six content fields.
pub fn issue_from_row(id: String, data: &str) -> Result<Issue> {
    let content: NewIssue =
        serde_json::from_str(data).map_err(|e| IssueError::CorruptRecord {
            id: id.clone(),
            reason: e.to_string(),
        })?;
    Ok(content.with_id(id))
}
