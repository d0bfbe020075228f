//! Notes endpoint handlers.

use crate::dto::{ListNotesParams, UpdateNoteRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use notekeeper_core::{core_version, NewNote, Note, NoteId};
use serde_json::{json, Value};
use uuid::Uuid;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Notes API",
        "version": core_version(),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn fallback() -> ApiError {
    ApiError::not_found("Resource not found")
}

/// `POST /notes`
pub async fn create_note(
    State(state): State<AppState>,
    body: Result<Json<NewNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(input) = body.map_err(|rejection| ApiError::malformed("body", rejection.body_text()))?;
    let note = state.run(move |service| service.create(input)).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// `GET /notes`
pub async fn list_notes(
    State(state): State<AppState>,
    params: Result<Query<ListNotesParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) =
        params.map_err(|rejection| ApiError::malformed("query", rejection.body_text()))?;
    let query = params.into_query().map_err(ApiError::validation)?;

    let (notes, total) = state
        .run(move |service| {
            let notes = service.list(&query)?;
            let total = service.count(&query)?;
            Ok((notes, total))
        })
        .await?;

    let mut response = Json(notes).into_response();
    response
        .headers_mut()
        .insert(HeaderName::from_static(TOTAL_COUNT_HEADER), HeaderValue::from(total));
    Ok(response)
}

/// `GET /notes/{id}`
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let note = state.run(move |service| service.get(id)).await?;
    Ok(Json(note))
}

/// `PUT /notes/{id}`
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let Json(request) =
        body.map_err(|rejection| ApiError::malformed("body", rejection.body_text()))?;
    let patch = request.into_patch().map_err(ApiError::validation)?;
    let note = state.run(move |service| service.update(id, patch)).await?;
    Ok(Json(note))
}

/// `DELETE /notes/{id}`
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_note_id(&id)?;
    state.run(move |service| service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ids are opaque strings to clients; anything that is not a stored UUID
/// simply does not exist.
fn parse_note_id(raw: &str) -> Result<NoteId, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Note not found"))
}
