//! Domain error to HTTP response mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use backoffice_core::{DomainError, ErrorKind};

use crate::response::{ApiResponse, ErrorBody};

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] DomainError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let code = err.code();

        // Internal causes stay in the logs.
        let message = match code.kind() {
            ErrorKind::Internal => {
                tracing::error!("{}: {}", code.full_code(), err);
                code.message().to_string()
            }
            ErrorKind::Validation => {
                tracing::debug!("{}: {}", code.full_code(), err);
                err.to_string()
            }
            _ => {
                tracing::warn!("{}: {}", code.full_code(), err);
                err.to_string()
            }
        };

        let status = StatusCode::from_u16(code.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ApiResponse::failure(ErrorBody {
            code: code.full_code(),
            status: status.as_u16(),
            message,
            details: err.details(),
        }));

        (status, body).into_response()
    }
}
