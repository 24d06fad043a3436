//! Materialized HTTP responses
//!
//! The contract layer produces complete responses (status, headers, body) so
//! the cache decorator can store and replay them byte for byte.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use convos_common::{headers, Outcome, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ApiResponse {
    /// Status plus the result-code and message headers every response carries
    pub fn from_outcome(outcome: &Outcome) -> Self {
        let mut response = Self {
            status: outcome.http_status(),
            headers: HeaderMap::new(),
            body: None,
        };
        response
            .headers
            .insert(headers::RESULT_CODE, HeaderValue::from(outcome.code().code()));
        response.text_header(headers::MESSAGE, &outcome.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Set a header from free text; text that cannot be carried is dropped
    pub fn text_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Some(value) = headers::text_value(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn number_header(mut self, name: HeaderName, value: i64) -> Self {
        self.headers.insert(name, HeaderValue::from(value));
        self
    }

    /// `private, must-revalidate, max-age=<seconds>`
    pub fn cache_control(self, max_age: u32) -> Self {
        self.text_header(
            header::CACHE_CONTROL,
            &format!("private, must-revalidate, max-age={}", max_age),
        )
    }

    /// JSON entity body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => Response::new(Body::from(body)),
            None => Response::new(Body::empty()),
        };
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
