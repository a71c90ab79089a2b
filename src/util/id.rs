//! ID generation for issues.
//!
//! Issue ids are ULIDs: a 48-bit millisecond timestamp followed by 80 random
//! bits, rendered as 26 characters of Crockford base32. The text form sorts
//! lexically in creation order, so `ORDER BY id DESC` lists newest first
//! without a timestamp column.

use crate::error::{IssueError, Result};
use std::sync::Mutex;
use ulid::{Generator, Ulid};

/// Length of the text form of an id.
pub const ID_LENGTH: usize = 26;

/// Thread-safe generator of strictly increasing ULIDs.
///
/// Two ids generated in the same millisecond differ by an increment of the
/// random part instead of fresh randomness, which keeps them ordered.
pub struct IdGenerator {
    inner: Mutex<Generator>,
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generator::new()),
        }
    }

    /// Generate the next id.
    ///
    /// # Errors
    ///
    /// Returns `IssueError::IdGeneration` if the random part overflows
    /// within one millisecond (2^80 ids) or the generator lock is poisoned.
    pub fn generate(&self) -> Result<String> {
        let mut generator = self
            .inner
            .lock()
            .map_err(|_| IssueError::IdGeneration("generator lock poisoned".to_string()))?;
        let ulid = generator
            .generate()
            .map_err(|e| IssueError::IdGeneration(e.to_string()))?;
        Ok(ulid.to_string())
    }
}

/// Check that `id` is the text form of a ULID.
#[must_use]
pub fn is_valid_id_format(id: &str) -> bool {
    id.len() == ID_LENGTH && Ulid::from_string(id).is_ok()
}
