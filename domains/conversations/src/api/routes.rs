//! Route definitions for Conversations domain API

use axum::{routing::get, Router};

use super::handlers::{conversations, messages};
use super::middleware::ConversationsState;

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            "/api/Convo",
            get(conversations::list_convos).post(conversations::create_convo),
        )
        .route(
            "/api/Convo/{convo_id}",
            get(conversations::get_convo)
                .patch(conversations::patch_convo)
                .delete(conversations::delete_convo),
        )
}

/// Create message routes
fn message_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            "/api/Convo/{convo_id}/Message",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/api/Convo/{convo_id}/Message/{message_id}",
            get(messages::get_message)
                .post(messages::reply_to_message)
                .patch(messages::patch_message)
                .delete(messages::delete_message),
        )
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}
