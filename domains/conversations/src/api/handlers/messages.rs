//! Message API handlers

use axum::extract::State;
use convos_common::{Result, ValidatedJson, ValidatedPath};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::api::middleware::ConversationsState;
use crate::api::request::RequestContext;
use crate::api::response::ApiResponse;
use crate::domain::entities::{MessagePatch, NewMessage};

/// Request for posting a message or a reply
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MessagePost {
    /// Key is required, value may be null
    #[serde(deserialize_with = "Option::deserialize")]
    pub body: Option<String>,

    pub recipient: i64,
}

impl MessagePost {
    fn into_message(self, convo_id: i64, parent: Option<i64>) -> NewMessage {
        NewMessage {
            convo_id,
            parent,
            recipient: self.recipient,
            body: self.body,
        }
    }
}

/// Request for editing a message or marking it read
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
#[validate(schema(function = "validate_patch"))]
pub struct MessagePatchBody {
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub is_read: Option<bool>,
}

fn validate_patch(req: &MessagePatchBody) -> std::result::Result<(), ValidationError> {
    if req.body.is_none() && req.is_read.is_none() {
        return Err(ValidationError::new("empty_patch")
            .with_message("Either Body or IsRead must be supplied".into()));
    }
    Ok(())
}

impl From<MessagePatchBody> for MessagePatch {
    fn from(req: MessagePatchBody) -> Self {
        Self {
            body: req.body,
            is_read: req.is_read,
        }
    }
}

/// List messages in a conversation
pub async fn list_messages(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath(convo_id): ValidatedPath<i64>,
) -> Result<ApiResponse> {
    state.contract.list_messages(&ctx, convo_id).await
}

/// Get a message with its reply thread
pub async fn get_message(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath((convo_id, message_id)): ValidatedPath<(i64, i64)>,
) -> Result<ApiResponse> {
    state
        .contract
        .get_message(&ctx, convo_id, message_id)
        .await
}

/// Post a new root message
pub async fn create_message(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath(convo_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<MessagePost>,
) -> Result<ApiResponse> {
    state
        .contract
        .create_message(&ctx, req.into_message(convo_id, None))
        .await
}

/// Post a reply to `message_id`
pub async fn reply_to_message(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath((convo_id, message_id)): ValidatedPath<(i64, i64)>,
    ValidatedJson(req): ValidatedJson<MessagePost>,
) -> Result<ApiResponse> {
    state
        .contract
        .create_message(&ctx, req.into_message(convo_id, Some(message_id)))
        .await
}

pub async fn patch_message(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath((convo_id, message_id)): ValidatedPath<(i64, i64)>,
    ValidatedJson(req): ValidatedJson<MessagePatchBody>,
) -> Result<ApiResponse> {
    state
        .contract
        .patch_message(&ctx, convo_id, message_id, req.into())
        .await
}

pub async fn delete_message(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath((convo_id, message_id)): ValidatedPath<(i64, i64)>,
) -> Result<ApiResponse> {
    state
        .contract
        .delete_message(&ctx, convo_id, message_id)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_body_key_required() {
        let req: MessagePost =
            serde_json::from_str(r#"{"Body": null, "Recipient": 7}"#).unwrap();
        assert!(req.body.is_none());
        assert!(serde_json::from_str::<MessagePost>(r#"{"Recipient": 7}"#).is_err());
        assert!(
            serde_json::from_str::<MessagePost>(r#"{"Body": "hi", "Recipient": 7, "Parent": 1}"#)
                .is_err()
        );
    }

    #[test]
    fn test_reply_takes_parent_from_path() {
        let req: MessagePost =
            serde_json::from_str(r#"{"Body": "hi", "Recipient": 7}"#).unwrap();
        let message = req.into_message(4, Some(9));
        assert_eq!(message.convo_id, 4);
        assert_eq!(message.parent, Some(9));
        assert_eq!(message.recipient, 7);
    }

    #[test]
    fn test_patch_needs_at_least_one_field() {
        let empty: MessagePatchBody = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.validate().is_err());

        let nulls: MessagePatchBody =
            serde_json::from_str(r#"{"Body": null, "IsRead": null}"#).unwrap();
        assert!(nulls.validate().is_err());

        let read: MessagePatchBody = serde_json::from_str(r#"{"IsRead": true}"#).unwrap();
        assert!(read.validate().is_ok());
        assert_eq!(MessagePatch::from(read).is_read, Some(true));
    }
}
