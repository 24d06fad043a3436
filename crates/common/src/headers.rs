//! Custom header names used on every API response and request

use axum::http::{HeaderName, HeaderValue};

/// Request header carrying the already-resolved caller identity
pub const CALLER_ID: HeaderName = HeaderName::from_static("x-authorization");

/// Numeric `ResultCode` of the operation
pub const RESULT_CODE: HeaderName = HeaderName::from_static("x-result-code");

/// Diagnostics joined with "; "
pub const MESSAGE: HeaderName = HeaderName::from_static("x-message");

/// Newest item still before the paging cursor, or the entity's last update
pub const LAST_MODIFIED: HeaderName = HeaderName::from_static("x-last-modified");

/// Location of a newly created resource
pub const LOCATION: HeaderName = HeaderName::from_static("x-uri-reference");

/// Link to the next page of a list
pub const NEXT_PAGE: HeaderName = HeaderName::from_static("x-uri-next-page");

/// Total number of items matching a list request
pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

/// Number of items in this page
pub const RELATIVE_COUNT: HeaderName = HeaderName::from_static("x-response-count");

/// Header value for free text; control characters become spaces.
///
/// Returns `None` only when the text cannot be carried at all.
pub fn text_value(text: &str) -> Option<HeaderValue> {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_bytes(cleaned.trim().as_bytes()).ok()
}
