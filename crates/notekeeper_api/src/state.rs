//! Shared application state.

use crate::error::ApiError;
use notekeeper_core::{NoteService, ServiceResult, SqliteNoteStore};
use std::sync::{Arc, Mutex};

/// Service handle shared by all handlers.
///
/// SQLite work is blocking, so calls are moved onto the blocking pool and
/// serialized through the mutex. Concurrent updates to one note resolve as
/// last writer wins.
#[derive(Clone)]
pub struct AppState {
    service: Arc<Mutex<NoteService<SqliteNoteStore>>>,
}

impl AppState {
    pub fn new(service: NoteService<SqliteNoteStore>) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }

    /// Runs `op` against the service on the blocking thread pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&NoteService<SqliteNoteStore>) -> ServiceResult<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let joined = tokio::task::spawn_blocking(move || {
            let guard = service
                .lock()
                .map_err(|_| ApiError::internal("note service lock poisoned"))?;
            op(&guard).map_err(ApiError::from)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) => Err(ApiError::internal(format!("blocking task failed: {err}"))),
        }
    }
}
