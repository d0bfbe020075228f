//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the Record Store contract used by the note service.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Scan order is stable across calls without intervening inserts.

pub mod note_repo;
