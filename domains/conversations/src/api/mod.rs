//! API layer for the Conversations domain
//!
//! Contains the contract layer, its cache decorator, HTTP handlers, routes,
//! and domain state definition.

pub mod cache;
pub mod contract;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routes;

pub use cache::{CacheKey, CachedContract, MemoryResponseCache, ResponseCache};
pub use contract::{ConvoContract, HttpContract};
pub use middleware::ConversationsState;
pub use request::RequestContext;
pub use response::ApiResponse;
pub use routes::routes;
