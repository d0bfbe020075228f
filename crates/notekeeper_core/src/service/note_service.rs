//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/get/list/update/delete APIs.
//! - Own defaults, tag encoding, partial-update rules and pagination math.
//! - Report absence as a typed `NotFound` instead of an empty value.
//!
//! # Invariants
//! - `create` sets `created_at == updated_at`.
//! - `update` only touches fields present in the patch and always
//!   refreshes `updated_at`, which never moves backwards.
//! - Timestamps have millisecond precision so returned notes equal their
//!   read-back.

use crate::model::note::{NewNote, Note, NoteId, NotePatch, ValidationError};
use crate::repo::note_repo::{NoteFilter, NoteRecord, NoteStore, RepoError};
use crate::service::samples::sample_notes;
use crate::tags::{decode_tags, encode_tags};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target note does not exist.
    NotFound(NoteId),
    /// Input failed field validation.
    Validation(Vec<ValidationError>),
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Validation(errors) => {
                write!(f, "validation failed")?;
                for (idx, err) in errors.iter().enumerate() {
                    let sep = if idx == 0 { ": " } else { "; " };
                    write!(f, "{sep}{err}")?;
                }
                Ok(())
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// List request after page math.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    pub skip: u64,
    pub limit: u32,
    /// Substring searched in title or content; empty disables search.
    pub search: String,
    /// `None` = no filter, `Some(flag)` = only notes with `archived == flag`.
    pub archived: Option<bool>,
}

impl NoteListQuery {
    /// Builds a query from 1-based `page` and `per_page`.
    ///
    /// `page = 0` is treated as the first page.
    pub fn page(page: u32, per_page: u32) -> Self {
        let skip = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        Self {
            skip,
            limit: per_page,
            ..Self::default()
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn archived(mut self, archived: Option<bool>) -> Self {
        self.archived = archived;
        self
    }

    fn filter(&self) -> NoteFilter {
        NoteFilter {
            search: (!self.search.is_empty()).then(|| self.search.clone()),
            archived: self.archived,
        }
    }
}

/// Note service facade over a Record Store.
pub struct NoteService<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NoteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates one note with a fresh id.
    pub fn create(&self, input: NewNote) -> ServiceResult<Note> {
        input.validate().map_err(ServiceError::Validation)?;

        let now = now_utc();
        let note = Note {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            tags: input.tags.unwrap_or_default(),
            archived: input.archived.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };

        self.put_note(&note, "note_create")?;
        info!(
            "event=note_create module=service status=ok note_id={} tags={}",
            note.id,
            note.tags.len()
        );
        Ok(note)
    }

    /// Gets one note by id.
    pub fn get(&self, id: NoteId) -> ServiceResult<Note> {
        let record = self
            .store
            .get(id)
            .map_err(|err| storage_error("note_get", err))?
            .ok_or(ServiceError::NotFound(id))?;
        record_to_note(record)
    }

    /// Lists notes in insertion order. An empty page is not an error.
    pub fn list(&self, query: &NoteListQuery) -> ServiceResult<Vec<Note>> {
        let records = self
            .store
            .scan(&query.filter(), query.skip, query.limit)
            .map_err(|err| storage_error("note_list", err))?;
        records.into_iter().map(record_to_note).collect()
    }

    /// Counts notes matching the query's search and archived filter.
    pub fn count(&self, query: &NoteListQuery) -> ServiceResult<u64> {
        self.store
            .count(&query.filter())
            .map_err(|err| storage_error("note_count", err))
    }

    /// Applies present patch fields and refreshes `updated_at`.
    pub fn update(&self, id: NoteId, patch: NotePatch) -> ServiceResult<Note> {
        patch.validate().map_err(ServiceError::Validation)?;

        let mut note = self.get(id)?;
        let fields = changed_fields(&patch);
        patch.apply_to(&mut note);
        note.updated_at = now_utc().max(note.updated_at);

        self.put_note(&note, "note_update")?;
        info!(
            "event=note_update module=service status=ok note_id={} fields={}",
            note.id, fields
        );
        Ok(note)
    }

    /// Permanently removes one note.
    pub fn delete(&self, id: NoteId) -> ServiceResult<()> {
        match self.store.delete(id) {
            Ok(()) => {
                info!("event=note_delete module=service status=ok note_id={id}");
                Ok(())
            }
            Err(RepoError::NotFound(id)) => Err(ServiceError::NotFound(id)),
            Err(err) => Err(storage_error("note_delete", err)),
        }
    }

    /// Removes all notes. Returns the number removed.
    pub fn clear(&self) -> ServiceResult<u64> {
        let removed = self
            .store
            .clear()
            .map_err(|err| storage_error("note_clear", err))?;
        info!("event=note_clear module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Inserts the built-in sample notes.
    pub fn seed_samples(&self) -> ServiceResult<Vec<Note>> {
        sample_notes()
            .into_iter()
            .map(|sample| self.create(sample))
            .collect()
    }

    /// Seeds sample notes only when the store is empty. Returns how many
    /// notes were inserted.
    pub fn seed_if_empty(&self) -> ServiceResult<usize> {
        let existing = self.count(&NoteListQuery::default())?;
        if existing > 0 {
            info!("event=note_seed module=service status=skipped existing={existing}");
            return Ok(0);
        }
        let seeded = self.seed_samples()?.len();
        info!("event=note_seed module=service status=ok inserted={seeded}");
        Ok(seeded)
    }

    fn put_note(&self, note: &Note, event: &'static str) -> ServiceResult<()> {
        let record = note_to_record(note);
        self.store
            .put(&record)
            .map_err(|err| storage_error(event, err))
    }
}

fn storage_error(event: &'static str, err: RepoError) -> ServiceError {
    if let RepoError::NotFound(id) = err {
        return ServiceError::NotFound(id);
    }
    error!("event={event} module=service status=error error_code=storage_failed error={err}");
    ServiceError::Storage(err)
}

fn changed_fields(patch: &NotePatch) -> String {
    if patch.is_empty() {
        return "none".to_string();
    }
    let mut fields = Vec::new();
    if patch.title.is_some() {
        fields.push("title");
    }
    if patch.content.is_some() {
        fields.push("content");
    }
    if patch.tags.is_some() {
        fields.push("tags");
    }
    if patch.archived.is_some() {
        fields.push("archived");
    }
    fields.join(",")
}

fn now_utc() -> DateTime<Utc> {
    let millis = Utc::now().timestamp_millis();
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

fn note_to_record(note: &Note) -> NoteRecord {
    NoteRecord {
        id: note.id,
        title: note.title.clone(),
        content: note.content.clone(),
        tags: encode_tags(&note.tags),
        archived: note.archived,
        created_at: note.created_at.timestamp_millis(),
        updated_at: note.updated_at.timestamp_millis(),
    }
}

fn record_to_note(record: NoteRecord) -> ServiceResult<Note> {
    let tags = decode_tags(&record.tags).map_err(|err| {
        storage_error(
            "note_decode",
            RepoError::InvalidData(format!("notes.tags for {}: {err}", record.id)),
        )
    })?;
    let created_at = millis_to_utc(record.id, "created_at", record.created_at)?;
    let updated_at = millis_to_utc(record.id, "updated_at", record.updated_at)?;

    Ok(Note {
        id: record.id,
        title: record.title,
        content: record.content,
        tags,
        archived: record.archived,
        created_at,
        updated_at,
    })
}

fn millis_to_utc(id: NoteId, column: &str, millis: i64) -> ServiceResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        storage_error(
            "note_decode",
            RepoError::InvalidData(format!("notes.{column} for {id} out of range: {millis}")),
        )
    })
}
