//! Conversations domain state

use std::sync::Arc;

use crate::api::contract::ConvoContract;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    /// Fully decorated contract, wired once at startup
    pub contract: Arc<dyn ConvoContract>,
}

impl ConversationsState {
    pub fn new(contract: Arc<dyn ConvoContract>) -> Self {
        Self { contract }
    }
}
