//! Request shapes for the notes endpoints.
//!
//! Create bodies deserialize straight into `NewNote`; update bodies and list
//! queries need boundary-specific handling and live here.
//!
//! The `archived` query flag accepts `true/false`, `1/0`, `yes/no`, `y/n`,
//! `t/f` and `on/off`, case-insensitively.

use notekeeper_core::{NoteListQuery, NotePatch, ValidationError};
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// `PUT /notes/{id}` body.
///
/// Outer `None` = field omitted, `Some(None)` = explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tags: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub archived: Option<Option<bool>>,
}

impl UpdateNoteRequest {
    /// Converts to a service patch.
    ///
    /// `tags: null` clears the tags; `null` for any other field is rejected.
    pub fn into_patch(self) -> Result<NotePatch, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let title = non_null("title", self.title, &mut errors);
        let content = non_null("content", self.content, &mut errors);
        let archived = non_null("archived", self.archived, &mut errors);
        let tags = self.tags.map(Option::unwrap_or_default);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NotePatch {
            title,
            content,
            tags,
            archived,
        })
    }
}

/// `GET /notes` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotesParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "query_flag")]
    pub archived: Option<bool>,
}

impl ListNotesParams {
    pub fn into_query(self) -> Result<NoteListQuery, Vec<ValidationError>> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);

        let mut errors = Vec::new();
        if page < 1 {
            errors.push(ValidationError::new("page", "must be greater than or equal to 1"));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            errors.push(ValidationError::new(
                "per_page",
                format!("must be between 1 and {MAX_PER_PAGE}"),
            ));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NoteListQuery::page(page, per_page)
            .search(self.search.unwrap_or_default())
            .archived(self.archived))
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn query_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "t" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "n" | "f" | "off" => Ok(Some(false)),
        _ => Err(D::Error::invalid_value(
            Unexpected::Str(&raw),
            &"a boolean flag such as true, false, 1, 0, yes or no",
        )),
    }
}

fn non_null<T>(
    field: &str,
    value: Option<Option<T>>,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    match value {
        Some(None) => {
            errors.push(ValidationError::new(field, "may not be null"));
            None
        }
        Some(Some(value)) => Some(value),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ListNotesParams, UpdateNoteRequest};
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(json: &str) -> UpdateNoteRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn omitted_fields_stay_absent() {
        let patch = parse(r#"{"archived": true}"#).into_patch().unwrap();
        assert_eq!(patch.archived, Some(true));
        assert!(patch.title.is_none());
        assert!(patch.content.is_none());
        assert!(patch.tags.is_none());
    }

    #[test]
    fn explicit_empty_values_are_present() {
        let patch = parse(r#"{"tags": [], "title": ""}"#).into_patch().unwrap();
        assert_eq!(patch.tags, Some(Vec::new()));
        assert_eq!(patch.title.as_deref(), Some(""));
    }

    #[test]
    fn null_tags_clear_and_null_title_is_rejected() {
        let patch = parse(r#"{"tags": null}"#).into_patch().unwrap();
        assert_eq!(patch.tags, Some(Vec::new()));

        let errors = parse(r#"{"title": null, "archived": null}"#)
            .into_patch()
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|err| err.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "archived"]);
    }

    fn query(uri: &str) -> Result<ListNotesParams, String> {
        let uri: Uri = uri.parse().unwrap();
        Query::<ListNotesParams>::try_from_uri(&uri)
            .map(|Query(params)| params)
            .map_err(|rejection| rejection.body_text())
    }

    #[test]
    fn archived_flag_accepts_common_spellings() {
        for (raw, expected) in [
            ("true", true),
            ("1", true),
            ("YES", true),
            ("on", true),
            ("false", false),
            ("0", false),
            ("no", false),
            ("Off", false),
        ] {
            let params = query(&format!("/notes?archived={raw}")).unwrap();
            assert_eq!(params.archived, Some(expected), "archived={raw}");
        }

        assert_eq!(query("/notes").unwrap().archived, None);
        assert!(query("/notes?archived=maybe").is_err());
    }

    #[test]
    fn list_params_default_to_first_page_of_ten() {
        let query = ListNotesParams::default().into_query().unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 10);
        assert_eq!(query.archived, None);
        assert!(query.search.is_empty());
    }

    #[test]
    fn list_params_enforce_ranges() {
        let params = ListNotesParams {
            page: Some(0),
            per_page: Some(101),
            ..ListNotesParams::default()
        };
        assert_eq!(params.into_query().unwrap_err().len(), 2);

        let params = ListNotesParams {
            page: Some(3),
            per_page: Some(20),
            archived: Some(false),
            ..ListNotesParams::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.skip, 40);
        assert_eq!(query.archived, Some(false));
    }
}
