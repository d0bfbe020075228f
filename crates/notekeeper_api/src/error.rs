//! API error type and its JSON body.
//!
//! Status mapping:
//! - `ServiceError::NotFound` -> 404 `NOT_FOUND`
//! - `ServiceError::Validation` and malformed requests -> 422 `VALIDATION_ERROR`
//! - `ServiceError::Storage` -> 500 `DATABASE_ERROR` (logged, detail hidden)
//! - anything else -> 500 `INTERNAL_ERROR` (logged, detail hidden)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use log::error;
use notekeeper_core::{ServiceError, ValidationError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_code: &'static str,
    pub detail: String,
    pub errors: Vec<ValidationError>,
}

/// Serialized error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub error_code: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error_code: NOT_FOUND,
            detail: detail.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            error_code: VALIDATION_ERROR,
            detail: "Validation failed".to_string(),
            errors,
        }
    }

    /// Malformed body or query string that never reached field validation.
    pub fn malformed(field: &str, message: impl Into<String>) -> Self {
        Self::validation(vec![ValidationError::new(field, message)])
    }

    /// Logs `cause` and returns an opaque 500.
    pub fn internal(cause: impl Display) -> Self {
        error!("event=api_error module=api status=error error_code={INTERNAL_ERROR} error={cause}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error_code: INTERNAL_ERROR,
            detail: "Internal server error".to_string(),
            errors: Vec::new(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            detail: self.detail.clone(),
            error_code: self.error_code,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            errors: self.errors.clone(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.error_code, self.detail)
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::NotFound(_) => Self::not_found("Note not found"),
            ServiceError::Validation(errors) => Self::validation(errors),
            ServiceError::Storage(err) => {
                error!(
                    "event=api_error module=api status=error error_code={DATABASE_ERROR} error={err}"
                );
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error_code: DATABASE_ERROR,
                    detail: "Internal server error".to_string(),
                    errors: Vec::new(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}
