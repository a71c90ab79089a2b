//! `issue_report`: a minimal issue-reporting web service.
//!
//! Clients `POST` structured reports to `/issues/` and `GET` the same path
//! to list them, newest first. Reports live in a single `SQLite` table.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod server;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ErrorCode, IssueError, Result, StructuredError};
