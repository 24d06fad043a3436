//! Outcome taxonomy shared by every layer
//!
//! A `ResultCode` classifies how an operation ended, independently of the
//! transport. The status map translates it to an HTTP status at the edge.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Internal classification of an operation's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    /// Everything behaved as expected
    #[default]
    Ok,
    /// The input into the operation was invalid
    InvalidInputData,
    /// The specific entity requested could not be found
    EntityNotFound,
    /// The operation produced no results
    NoResults,
    /// The caller may not perform the operation
    Unauthorized,
    /// A new resource was created
    Created,
    /// A resource was deleted
    Deleted,
    /// The operation misbehaved for an unknown reason
    Unknown,
}

impl ResultCode {
    /// Every member of the taxonomy, in wire order
    pub const ALL: [ResultCode; 8] = [
        ResultCode::Ok,
        ResultCode::InvalidInputData,
        ResultCode::EntityNotFound,
        ResultCode::NoResults,
        ResultCode::Unauthorized,
        ResultCode::Created,
        ResultCode::Deleted,
        ResultCode::Unknown,
    ];

    /// Numeric wire value, as emitted in the `X-Result-Code` header
    pub fn code(self) -> i32 {
        match self {
            ResultCode::Ok => 0,
            ResultCode::InvalidInputData => 1,
            ResultCode::EntityNotFound => 2,
            ResultCode::NoResults => 3,
            ResultCode::Unauthorized => 4,
            ResultCode::Created => 5,
            ResultCode::Deleted => 6,
            ResultCode::Unknown => 7,
        }
    }

    /// Decode a numeric value reported by the store
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Transport status for this outcome
    pub fn http_status(self) -> StatusCode {
        match self {
            ResultCode::Ok => StatusCode::OK,
            ResultCode::InvalidInputData => StatusCode::BAD_REQUEST,
            ResultCode::EntityNotFound => StatusCode::NOT_FOUND,
            ResultCode::NoResults => StatusCode::NOT_FOUND,
            ResultCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ResultCode::Created => StatusCode::CREATED,
            ResultCode::Deleted => StatusCode::NO_CONTENT,
            ResultCode::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultCode::Ok => write!(f, "OK"),
            ResultCode::InvalidInputData => write!(f, "INVALID_INPUT_DATA"),
            ResultCode::EntityNotFound => write!(f, "ENTITY_NOT_FOUND"),
            ResultCode::NoResults => write!(f, "NO_RESULTS"),
            ResultCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ResultCode::Created => write!(f, "CREATED"),
            ResultCode::Deleted => write!(f, "DELETED"),
            ResultCode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Map a raw numeric code to a transport status.
///
/// Codes outside the taxonomy fall back to 500.
pub fn http_status_for(code: i32) -> StatusCode {
    ResultCode::from_code(code)
        .map(ResultCode::http_status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Outcome of a single operation: one code plus the diagnostics gathered on the way
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    code: ResultCode,
    messages: Vec<String>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(code: ResultCode) -> Self {
        Self {
            code,
            messages: Vec::new(),
        }
    }

    pub fn code(&self) -> ResultCode {
        self.code
    }

    pub fn set_code(&mut self, code: ResultCode) {
        self.code = code;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Append a diagnostic; earlier messages are never overwritten
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record a failure: set the code and append its diagnostic
    pub fn fail(&mut self, code: ResultCode, message: impl Into<String>) {
        self.code = code;
        self.add_message(message);
    }

    pub fn is(&self, code: ResultCode) -> bool {
        self.code == code
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join("; "))
    }
}
