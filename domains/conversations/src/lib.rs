//! Conversations domain: two-party conversations, messages and replies
//!
//! Layers, innermost first: the `Store` contract, the Domain Manager
//! (`ConvoManager`) and its logging decorator, then the Contract Layer
//! (`ConvoContract`) and its cache decorator, exposed through axum routes.

pub mod api;
pub mod domain;
pub mod manager;
pub mod repository;

#[cfg(test)]
mod testing;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    Conversation, Message, MessagePatch, MessageRow, NewConvo, NewMessage, PageQuery,
};

// Re-export manager and store types
pub use manager::{ConvoManager, LoggingConvoManager, Page, Reply, StoreConvoManager};
pub use repository::{MemoryStore, Operation, Params, PgStore, Store, StoreResults, StoreStatus};

// Re-export API types
pub use api::routes;
pub use api::{
    ApiResponse, CachedContract, ConversationsState, ConvoContract, HttpContract,
    MemoryResponseCache, RequestContext, ResponseCache,
};
