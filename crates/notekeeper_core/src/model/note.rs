//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record returned to callers.
//! - Define create/patch inputs and their field validation.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `updated_at >= created_at`.
//! - `NotePatch` fields set to `None` are absent, not cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every note.
pub type NoteId = Uuid;

pub const TITLE_MAX_CHARS: usize = 120;
pub const CONTENT_MAX_CHARS: usize = 10_000;
pub const TAGS_MAX_COUNT: usize = 10;
pub const TAG_MAX_CHARS: usize = 50;

/// Canonical note shape returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Input order is preserved on round-trip.
    pub tags: Vec<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for note creation.
///
/// `tags` and `archived` are optional; the service fills in an empty tag
/// list and `archived = false` when they are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub archived: Option<bool>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: None,
            archived: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        collect(&mut errors, validate_title(&self.title));
        collect(&mut errors, validate_content(&self.content));
        if let Some(tags) = &self.tags {
            collect(&mut errors, validate_tags(tags));
        }
        finish(errors)
    }
}

/// Partial update input.
///
/// Each field is presence-tagged: `None` leaves the stored value untouched,
/// `Some(value)` overwrites it, even when `value` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub archived: Option<bool>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.archived.is_none()
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            collect(&mut errors, validate_title(title));
        }
        if let Some(content) = &self.content {
            collect(&mut errors, validate_content(content));
        }
        if let Some(tags) = &self.tags {
            collect(&mut errors, validate_tags(tags));
        }
        finish(errors)
    }

    /// Applies present fields onto `note`. Timestamps are not touched.
    pub fn apply_to(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        if let Some(archived) = self.archived {
            note.archived = archived;
        }
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    validate_length("title", title, 1, TITLE_MAX_CHARS)
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    validate_length("content", content, 1, CONTENT_MAX_CHARS)
}

pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > TAGS_MAX_COUNT {
        return Err(ValidationError::new(
            "tags",
            format!("maximum {TAGS_MAX_COUNT} tags allowed, got {}", tags.len()),
        ));
    }
    for (idx, tag) in tags.iter().enumerate() {
        if tag.chars().count() > TAG_MAX_CHARS {
            return Err(ValidationError::new(
                format!("tags[{idx}]"),
                format!("tag length cannot exceed {TAG_MAX_CHARS} characters"),
            ));
        }
    }
    Ok(())
}

fn validate_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {min} and {max} characters, got {len}"),
        ));
    }
    Ok(())
}

fn collect(errors: &mut Vec<ValidationError>, result: Result<(), ValidationError>) {
    if let Err(err) = result {
        errors.push(err);
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_tags, NewNote, NotePatch, TAG_MAX_CHARS, TITLE_MAX_CHARS};

    #[test]
    fn title_length_is_counted_in_characters() {
        let title: String = "é".repeat(TITLE_MAX_CHARS);
        assert!(NewNote::new(title, "body").validate().is_ok());

        let too_long: String = "é".repeat(TITLE_MAX_CHARS + 1);
        let errors = NewNote::new(too_long, "body").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn new_note_reports_every_invalid_field() {
        let errors = NewNote::new("", "").validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|err| err.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "content"]);
    }

    #[test]
    fn tags_count_and_length_limits() {
        let eleven: Vec<String> = (0..11).map(|idx| format!("t{idx}")).collect();
        assert!(validate_tags(&eleven).is_err());

        let long = vec!["ok".to_string(), "x".repeat(TAG_MAX_CHARS + 1)];
        let err = validate_tags(&long).unwrap_err();
        assert_eq!(err.field, "tags[1]");

        assert!(validate_tags(&[]).is_ok());
    }

    #[test]
    fn patch_with_explicit_empty_title_is_rejected() {
        let patch = NotePatch {
            title: Some(String::new()),
            ..NotePatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn patch_with_explicit_empty_tags_is_valid_and_not_empty() {
        let patch = NotePatch {
            tags: Some(Vec::new()),
            ..NotePatch::default()
        };
        assert!(patch.validate().is_ok());
        assert!(!patch.is_empty());
        assert!(NotePatch::default().is_empty());
    }
}
