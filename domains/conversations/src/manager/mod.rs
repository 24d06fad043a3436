//! Domain Manager: validation, store orchestration and row shaping
//!
//! Every operation takes the caller id resolved upstream. Business failures
//! come back inside the `Outcome`; `Err` is reserved for faults.

pub mod logging;
pub mod store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convos_common::{Outcome, Result};

use crate::domain::entities::{
    Conversation, Message, MessagePatch, NewConvo, NewMessage, PageQuery,
};
use crate::domain::timestamps::timestamp_floor;

pub use logging::LoggingConvoManager;
pub use store::StoreConvoManager;

/// Outcome of a single-entity operation
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub outcome: Outcome,
    pub value: Option<T>,
}

impl<T> Reply<T> {
    pub fn new(outcome: Outcome, value: Option<T>) -> Self {
        Self { outcome, value }
    }

    /// A reply carrying no value
    pub fn bare(outcome: Outcome) -> Self {
        Self::new(outcome, None)
    }
}

/// Outcome of a list operation
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub outcome: Outcome,
    pub items: Vec<T>,
    /// Items matching the cursor, across all pages
    pub total: i64,
    /// Newest creation time among items before the cursor
    pub max_created: DateTime<Utc>,
}

impl<T> Page<T> {
    /// Empty page: no items, zero total, minimum timestamp
    pub fn empty(outcome: Outcome) -> Self {
        Self {
            outcome,
            items: Vec::new(),
            total: 0,
            max_created: timestamp_floor(),
        }
    }
}

/// Conversation and message operations
#[async_trait]
pub trait ConvoManager: Send + Sync {
    async fn delete_convo(&self, user_id: i64, convo_id: i64) -> Result<Outcome>;

    async fn delete_message(&self, user_id: i64, convo_id: i64, message_id: i64)
        -> Result<Outcome>;

    async fn list_convos(&self, user_id: i64, query: PageQuery) -> Result<Page<Conversation>>;

    async fn get_convo(&self, user_id: i64, convo_id: i64) -> Result<Reply<Conversation>>;

    async fn list_messages(
        &self,
        user_id: i64,
        convo_id: i64,
        query: PageQuery,
    ) -> Result<Page<Message>>;

    /// Fetch one message with its reply thread attached
    async fn get_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
    ) -> Result<Reply<Message>>;

    /// Returns the new conversation id on CREATED
    async fn create_convo(&self, user_id: i64, convo: NewConvo) -> Result<Reply<i64>>;

    /// Returns the new message id on CREATED
    async fn create_message(&self, user_id: i64, message: NewMessage) -> Result<Reply<i64>>;

    async fn patch_convo(
        &self,
        user_id: i64,
        convo_id: i64,
        subject: Option<String>,
    ) -> Result<Outcome>;

    async fn patch_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
        patch: MessagePatch,
    ) -> Result<Outcome>;
}
