//! Convos application composition root
//!
//! Wires the decorator chain once and composes the domain router into a
//! single application.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use convos_common::Config;
use convos_conversations::{
    CachedContract, ConversationsState, HttpContract, LoggingConvoManager, MemoryResponseCache,
    Store, StoreConvoManager,
};

/// Build the conversations state:
/// `CachedContract(HttpContract(LoggingConvoManager(StoreConvoManager(store))))`
pub fn conversations_state(config: &Config, store: Arc<dyn Store>) -> ConversationsState {
    let manager = LoggingConvoManager::new(StoreConvoManager::new(store, config.paging));
    let contract = CachedContract::new(
        HttpContract::new(manager, config),
        Arc::new(MemoryResponseCache::new()),
        Duration::from_secs(config.cache.response_ttl),
    );
    ConversationsState::new(Arc::new(contract))
}

/// Create the main application router with all routes
pub fn create_app(config: &Config, store: Arc<dyn Store>) -> Router {
    let state = conversations_state(config, store);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Convos API v0.1.0" }),
        )
        .merge(convos_conversations::routes().with_state(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
