//! Note Record Store contract and SQLite implementation.
//!
//! # Responsibility
//! - Durable keyed storage of raw note rows.
//! - Predicate scans (substring search, archived flag) with offset/limit.
//!
//! # Invariants
//! - `put` is an upsert and keeps the row's insertion sequence.
//! - Scans are ordered by insertion sequence (`seq ASC`).
//! - Search uses `instr()`, so matching is case-sensitive.
//! - Rows that cannot be decoded are reported, never masked.

use crate::db::DbError;
use crate::model::note::NoteId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    tags,
    archived,
    created_at,
    updated_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw persisted note row. Tags are kept in their encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub archived: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Scan predicate.
///
/// `archived` is three-valued: `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Substring matched against title OR content. Empty means no search.
    pub search: Option<String>,
    pub archived: Option<bool>,
}

/// Record Store interface for notes.
pub trait NoteStore {
    /// Inserts or overwrites the record with the same id.
    fn put(&self, record: &NoteRecord) -> RepoResult<()>;
    fn get(&self, id: NoteId) -> RepoResult<Option<NoteRecord>>;
    /// Removes one record; `NotFound` when absent.
    fn delete(&self, id: NoteId) -> RepoResult<()>;
    /// Returns matching records in insertion order after skipping `offset`.
    fn scan(&self, filter: &NoteFilter, offset: u64, limit: u32) -> RepoResult<Vec<NoteRecord>>;
    fn count(&self, filter: &NoteFilter) -> RepoResult<u64>;
    /// Removes every record and returns how many were deleted.
    fn clear(&self) -> RepoResult<u64>;
}

/// SQLite-backed note store owning its connection.
pub struct SqliteNoteStore {
    conn: Connection,
}

impl SqliteNoteStore {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        if !table_exists(&conn, "notes")? {
            return Err(RepoError::MissingRequiredTable("notes"));
        }
        Ok(Self { conn })
    }

    /// Exposes the underlying connection for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NoteStore for SqliteNoteStore {
    fn put(&self, record: &NoteRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO notes (
                id,
                title,
                content,
                tags,
                archived,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                tags = excluded.tags,
                archived = excluded.archived,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at;",
            params![
                record.id.to_string(),
                record.title.as_str(),
                record.content.as_str(),
                record.tags.as_str(),
                bool_to_int(record.archived),
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: NoteId) -> RepoResult<Option<NoteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn delete(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn scan(&self, filter: &NoteFilter, offset: u64, limit: u32) -> RepoResult<Vec<NoteRecord>> {
        let (where_sql, mut bind_values) = filter_clause(filter);
        let sql = format!("{NOTE_SELECT_SQL}{where_sql} ORDER BY seq ASC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_note_row(row)?);
        }
        Ok(records)
    }

    fn count(&self, filter: &NoteFilter) -> RepoResult<u64> {
        let (where_sql, bind_values) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM notes{where_sql};");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }

    fn clear(&self) -> RepoResult<u64> {
        let removed = self.conn.execute("DELETE FROM notes;", [])?;
        Ok(removed as u64)
    }
}

fn filter_clause(filter: &NoteFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values = Vec::new();

    if let Some(search) = filter.search.as_deref().filter(|value| !value.is_empty()) {
        sql.push_str(" AND (instr(title, ?) > 0 OR instr(content, ?) > 0)");
        bind_values.push(Value::Text(search.to_string()));
        bind_values.push(Value::Text(search.to_string()));
    }

    if let Some(archived) = filter.archived {
        sql.push_str(" AND archived = ?");
        bind_values.push(Value::Integer(bool_to_int(archived)));
    }

    (sql, bind_values)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<NoteRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id"))
    })?;

    let archived = match row.get::<_, i64>("archived")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid archived value `{other}` in notes.archived"
            )));
        }
    };

    Ok(NoteRecord {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        tags: row.get("tags")?,
        archived,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
