//! HTTP error mapping
//!
//! Every transfer failure ends here. Client errors are logged at WARN,
//! server errors at ERROR, and 5xx bodies never carry backend details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::claims::ClaimsError;
use crate::file_storage::BackendError;
use crate::observability::{log_event_with_fields, Event};
use crate::signing::SigningError;

/// Errors produced by the transfer handlers
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Missing blob id")]
    MissingBlobId,

    #[error("Malformed generation header: {0:?}")]
    MalformedGeneration(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            GatewayError::Claims(e) => e.status_code(),
            GatewayError::Signing(e) => e.status_code(),
            GatewayError::Backend(e) => e.status_code(),
            GatewayError::MissingBlobId => 400,
            GatewayError::MalformedGeneration(_) => 400,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    fn event(&self) -> Event {
        match self {
            GatewayError::Backend(BackendError::GenerationMismatch { .. }) => {
                Event::BlobPreconditionFailed
            }
            _ if self.is_client_error() => Event::RequestRejected,
            _ => Event::BackendFailed,
        }
    }

    /// Log this error against the request that produced it
    pub fn log(&self, request_id: &str, route: &str) {
        let reason = self.to_string();
        let status = self.status_code().as_u16().to_string();
        log_event_with_fields(
            self.event(),
            &[
                ("request_id", request_id),
                ("route", route),
                ("reason", &reason),
                ("status", &status),
            ],
        );
    }

    /// Log and return self
    pub fn logged(self, request_id: &str, route: &str) -> Self {
        self.log(request_id, route);
        self
    }
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&GatewayError> for ErrorResponse {
    fn from(err: &GatewayError) -> Self {
        let status = err.status_code();
        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            err.to_string()
        };
        Self {
            error,
            code: status.as_u16(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}
