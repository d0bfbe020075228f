//! Core domain logic for Notekeeper.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tags;

pub use config::{
    Config, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig, CORS_ANY_ORIGIN,
};
pub use logging::{default_log_level, init_logging};
pub use model::note::{
    NewNote, Note, NoteId, NotePatch, ValidationError, CONTENT_MAX_CHARS, TAGS_MAX_COUNT,
    TAG_MAX_CHARS, TITLE_MAX_CHARS,
};
pub use repo::note_repo::{
    NoteFilter, NoteRecord, NoteStore, RepoError, RepoResult, SqliteNoteStore,
};
pub use service::note_service::{NoteListQuery, NoteService, ServiceError, ServiceResult};
pub use tags::{decode_tags, encode_tags, TagCodecError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
