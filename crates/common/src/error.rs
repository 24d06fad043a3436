//! Fault types and their transport translation
//!
//! Business outcomes travel as `Outcome` values. `Error` is reserved for
//! faults: environmental failures and malformed requests rejected before
//! they reach the contract layer.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::headers;
use crate::outcome::ResultCode;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Convos application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unexpected(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Store(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is an environmental fault rather than a rejected request
    pub fn is_fault(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.is_fault() {
            tracing::error!(error = %self, "Internal server error");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }

        let mut response = self.status_code().into_response();
        let headers = response.headers_mut();
        headers.insert(
            headers::RESULT_CODE,
            HeaderValue::from(ResultCode::InvalidInputData.code()),
        );
        if let Some(message) = headers::text_value(&self.to_string()) {
            headers.insert(headers::MESSAGE, message);
        }
        response
    }
}
