//! Issue persistence.
//!
//! `IssueStore` is the contract the HTTP layer depends on; `SqliteIssueStore`
//! is the production implementation. Every operation is one self-contained
//! round trip with no connection state carried between calls.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteIssueStore, issue_from_row};

use crate::error::Result;
use crate::model::{Issue, NewIssue};

/// Durable persistence and retrieval of issues.
pub trait IssueStore: Send + Sync {
    /// Ensure the backing table exists. Safe to call on every startup.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the schema cannot be applied.
    fn initialize(&self) -> Result<()>;

    /// Persist a new issue and return its generated identifier.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the row cannot be written; no partial
    /// row is ever visible.
    fn create(&self, issue: &NewIssue) -> Result<String>;

    /// Every stored issue, newest first. Rows whose data cannot be decoded
    /// are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the query fails.
    fn list_all(&self) -> Result<Vec<Issue>>;
}
