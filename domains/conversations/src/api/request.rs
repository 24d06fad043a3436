//! Request metadata consumed by the contract layer

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, Method, Uri},
};
use convos_common::{headers, Outcome, PagingConfig, ResultCode};

use crate::domain::entities::PageQuery;
use crate::domain::timestamps::{cursor_ceiling, parse_timestamp};

/// Everything the contract layer reads from a request besides the body
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    /// Raw query string, as received
    pub query: String,
    /// Raw caller identity header, empty when absent
    pub caller_header: String,
    pairs: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new(method: Method, path: &str, query: Option<&str>, caller: Option<&str>) -> Self {
        let query = query.unwrap_or_default().to_string();
        let uri = format!("{}?{}", path, query)
            .parse::<Uri>()
            .unwrap_or_default();
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(&uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        Self {
            method,
            path: path.to_string(),
            query,
            caller_header: caller.unwrap_or_default().to_string(),
            pairs,
        }
    }

    /// Caller id from the identity header
    pub fn caller(&self) -> Result<i64, Outcome> {
        self.caller_header.trim().parse::<i64>().map_err(|_| {
            let mut outcome = Outcome::new();
            outcome.fail(ResultCode::Unauthorized, "Could not parse a valid user id");
            outcome
        })
    }

    /// First query value for `key`, matched case-insensitively
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Resolve `index`, `count` and `before` against the paging defaults
    pub fn page_query(&self, paging: &PagingConfig) -> Result<PageQuery, Outcome> {
        let mut outcome = Outcome::new();

        let index = self
            .query_value("index")
            .and_then(|value| value.trim().parse::<i32>().ok())
            .unwrap_or(paging.default_index);

        let count = match self
            .query_value("count")
            .and_then(|value| value.trim().parse::<i32>().ok())
        {
            Some(count) if count > paging.max_size => {
                outcome.fail(
                    ResultCode::InvalidInputData,
                    format!("Maximum page size is {}", paging.max_size),
                );
                count
            }
            Some(count) => count,
            None => paging.default_size,
        };

        let before = match self.query_value("before").filter(|v| !v.trim().is_empty()) {
            Some(value) => parse_timestamp(value).unwrap_or_else(|| {
                outcome.fail(
                    ResultCode::InvalidInputData,
                    "Could not read a valid date for the 'before' querystring parameter",
                );
                cursor_ceiling()
            }),
            None => cursor_ceiling(),
        };

        if outcome.is(ResultCode::Ok) {
            Ok(PageQuery {
                before,
                count,
                index,
            })
        } else {
            Err(outcome)
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = parts
            .headers
            .get(headers::CALLER_ID)
            .and_then(|value| value.to_str().ok());
        Ok(Self::new(
            parts.method.clone(),
            parts.uri.path(),
            parts.uri.query(),
            caller,
        ))
    }
}
