//! Shared utilities for `issue_report`.
//!
//! - ID generation (time-ordered ULIDs)

pub mod id;

pub use id::{IdGenerator, is_valid_id_format};
