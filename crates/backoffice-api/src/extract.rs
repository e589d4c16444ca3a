//! Extractor rejections folded into the domain `VALIDATION_FAILED` envelope.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` (and the path/query
//! equivalents) and call [`OrReject::or_reject`] with their domain.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use backoffice_core::{DomainError, ErrorDomain};

use crate::error::ApiError;

pub trait OrReject<T> {
    fn or_reject(self, domain: ErrorDomain) -> Result<T, ApiError>;
}

impl<T> OrReject<T> for Result<Json<T>, JsonRejection> {
    fn or_reject(self, domain: ErrorDomain) -> Result<T, ApiError> {
        self.map(|Json(value)| value)
            .map_err(|e| ApiError::from(DomainError::validation(domain, "body", e.body_text())))
    }
}

impl<T> OrReject<T> for Result<Path<T>, PathRejection> {
    fn or_reject(self, domain: ErrorDomain) -> Result<T, ApiError> {
        self.map(|Path(value)| value)
            .map_err(|e| ApiError::from(DomainError::validation(domain, "path", e.body_text())))
    }
}

impl<T> OrReject<T> for Result<Query<T>, QueryRejection> {
    fn or_reject(self, domain: ErrorDomain) -> Result<T, ApiError> {
        self.map(|Query(value)| value)
            .map_err(|e| ApiError::from(DomainError::validation(domain, "query", e.body_text())))
    }
}

/// Required query parameter that arrived as `None`.
pub fn required<T>(value: Option<T>, domain: ErrorDomain, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::from(DomainError::validation(domain, field, "is required")))
}
