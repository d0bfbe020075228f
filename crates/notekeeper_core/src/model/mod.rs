//! Domain model for notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own field-level validation rules shared by service and HTTP layers.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
