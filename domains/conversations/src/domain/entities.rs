//! Domain entities for Conversations domain
//!
//! Entities deserialize straight from the PascalCase rows the store returns
//! and serialize with the same names in API responses. Nullable columns map
//! to `None` and are omitted from responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamps;

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Conversation {
    pub id: i64,
    pub creator: i64,
    pub participant: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub date_created: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option", skip_serializing_if = "Option::is_none")]
    pub date_of_last_message: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub date_updated: DateTime<Utc>,
    pub num_messages: i32,
}

impl Conversation {
    /// Whether `user_id` is one of the two parties
    pub fn includes(&self, user_id: i64) -> bool {
        self.creator == user_id || self.participant == user_id
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub id: i64,
    pub convo_id: i64,
    pub sender: i64,
    pub recipient: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub is_read: bool,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub date_created: DateTime<Utc>,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub date_updated: DateTime<Utc>,
    /// Replied-to message, attached when fetched by id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<Vec<Message>>,
}

/// A message row plus its depth in the reply chain (0 = the requested message)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageRow {
    #[serde(flatten)]
    pub message: Message,
    pub level: i32,
}

/// Input for creating a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct NewConvo {
    pub participant: i64,
    pub subject: Option<String>,
}

/// Input for creating a message; `parent` is set when replying
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub convo_id: i64,
    pub parent: Option<i64>,
    pub recipient: i64,
    pub body: Option<String>,
}

/// Partial update of a message; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    pub body: Option<String>,
    pub is_read: Option<bool>,
}

/// Cursor paging parameters for list operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageQuery {
    pub before: DateTime<Utc>,
    pub count: i32,
    pub index: i32,
}

impl PageQuery {
    /// Whether items remain past this page: `index*count + count < total`
    pub fn has_next_page(&self, total: i64) -> bool {
        let seen = i64::from(self.index)
            .saturating_mul(i64::from(self.count))
            .saturating_add(i64::from(self.count));
        seen < total
    }
}
