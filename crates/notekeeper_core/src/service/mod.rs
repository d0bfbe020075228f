//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate Record Store calls into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod note_service;
mod samples;
