//! Conversation API handlers

use axum::extract::State;
use convos_common::{Result, ValidatedJson, ValidatedPath};
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::api::request::RequestContext;
use crate::api::response::ApiResponse;
use crate::domain::entities::NewConvo;

/// Request for creating a conversation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConvoPost {
    pub participant: i64,

    /// Key is required, value may be null
    #[serde(deserialize_with = "Option::deserialize")]
    pub subject: Option<String>,
}

impl From<ConvoPost> for NewConvo {
    fn from(req: ConvoPost) -> Self {
        Self {
            participant: req.participant,
            subject: req.subject,
        }
    }
}

/// Request for renaming a conversation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConvoPatch {
    #[serde(deserialize_with = "Option::deserialize")]
    pub subject: Option<String>,
}

/// List conversations visible to the caller
pub async fn list_convos(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
) -> Result<ApiResponse> {
    state.contract.list_convos(&ctx).await
}

/// Get a single conversation by ID
pub async fn get_convo(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath(convo_id): ValidatedPath<i64>,
) -> Result<ApiResponse> {
    state.contract.get_convo(&ctx, convo_id).await
}

/// Create a new conversation with the caller as creator
pub async fn create_convo(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedJson(req): ValidatedJson<ConvoPost>,
) -> Result<ApiResponse> {
    state.contract.create_convo(&ctx, req.into()).await
}

pub async fn patch_convo(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath(convo_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<ConvoPatch>,
) -> Result<ApiResponse> {
    state.contract.patch_convo(&ctx, convo_id, req.subject).await
}

pub async fn delete_convo(
    State(state): State<ConversationsState>,
    ctx: RequestContext,
    ValidatedPath(convo_id): ValidatedPath<i64>,
) -> Result<ApiResponse> {
    state.contract.delete_convo(&ctx, convo_id).await
}
