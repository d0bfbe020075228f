//! SQLite connection setup for the note store.
//!
//! # Responsibility
//! - Hand out connections whose `notes` schema is current.
//! - Report why a database could not be opened or upgraded.
//!
//! # Invariants
//! - A connection returned by `open_db*` has every schema step applied.
//! - A database written by a newer build is never downgraded or touched.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading the notes database.
#[derive(Debug)]
pub enum DbError {
    /// Connection-level or pragma failure.
    Sqlite(rusqlite::Error),
    /// The file carries a schema step this build does not know.
    SchemaTooNew { found: u32, supported: u32 },
    /// One schema step failed; nothing from the batch was committed.
    SchemaStep {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "notes database is at schema {found}, this build supports up to {supported}"
            ),
            Self::SchemaStep {
                version,
                name,
                source,
            } => write!(f, "schema step {version} ({name}) failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::SchemaStep { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
