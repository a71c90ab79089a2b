//! Database schema definitions.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the issue database.
///
/// `data` holds the JSON encoding of the six content fields; `id` is the
/// ULID assigned at creation.
pub const SCHEMA_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS issues (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL
    );
";

/// Apply the schema to the database.
///
/// It is idempotent because all statements use `IF NOT EXISTS`; existing
/// tables and rows are never dropped or altered.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(())
}
