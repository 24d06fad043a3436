//! Fault logging around a Domain Manager
//!
//! Faults are logged with the operation's parameters and returned unchanged.
//! Business outcomes pass through untouched.

use async_trait::async_trait;
use convos_common::{Outcome, Result};

use super::{ConvoManager, Page, Reply};
use crate::domain::entities::{
    Conversation, Message, MessagePatch, NewConvo, NewMessage, PageQuery,
};

#[derive(Clone)]
pub struct LoggingConvoManager<M> {
    inner: M,
}

impl<M> LoggingConvoManager<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<M: ConvoManager> ConvoManager for LoggingConvoManager<M> {
    async fn delete_convo(&self, user_id: i64, convo_id: i64) -> Result<Outcome> {
        self.inner
            .delete_convo(user_id, convo_id)
            .await
            .inspect_err(|error| {
                tracing::error!(user_id, convo_id, error = %error, "delete_convo failed")
            })
    }

    async fn delete_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
    ) -> Result<Outcome> {
        self.inner
            .delete_message(user_id, convo_id, message_id)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    convo_id,
                    message_id,
                    error = %error,
                    "delete_message failed"
                )
            })
    }

    async fn list_convos(&self, user_id: i64, query: PageQuery) -> Result<Page<Conversation>> {
        self.inner
            .list_convos(user_id, query)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    before = %query.before,
                    count = query.count,
                    index = query.index,
                    error = %error,
                    "list_convos failed"
                )
            })
    }

    async fn get_convo(&self, user_id: i64, convo_id: i64) -> Result<Reply<Conversation>> {
        self.inner
            .get_convo(user_id, convo_id)
            .await
            .inspect_err(|error| {
                tracing::error!(user_id, convo_id, error = %error, "get_convo failed")
            })
    }

    async fn list_messages(
        &self,
        user_id: i64,
        convo_id: i64,
        query: PageQuery,
    ) -> Result<Page<Message>> {
        self.inner
            .list_messages(user_id, convo_id, query)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    convo_id,
                    before = %query.before,
                    count = query.count,
                    index = query.index,
                    error = %error,
                    "list_messages failed"
                )
            })
    }

    async fn get_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
    ) -> Result<Reply<Message>> {
        self.inner
            .get_message(user_id, convo_id, message_id)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    convo_id,
                    message_id,
                    error = %error,
                    "get_message failed"
                )
            })
    }

    async fn create_convo(&self, user_id: i64, convo: NewConvo) -> Result<Reply<i64>> {
        let participant = convo.participant;
        let subject = convo.subject.clone();
        self.inner
            .create_convo(user_id, convo)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    participant,
                    subject = ?subject,
                    error = %error,
                    "create_convo failed"
                )
            })
    }

    async fn create_message(&self, user_id: i64, message: NewMessage) -> Result<Reply<i64>> {
        let NewMessage {
            convo_id,
            parent,
            recipient,
            ..
        } = message;
        let body_len = message.body.as_ref().map(|body| body.chars().count());
        self.inner
            .create_message(user_id, message)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    convo_id,
                    parent = ?parent,
                    recipient,
                    body_len = ?body_len,
                    error = %error,
                    "create_message failed"
                )
            })
    }

    async fn patch_convo(
        &self,
        user_id: i64,
        convo_id: i64,
        subject: Option<String>,
    ) -> Result<Outcome> {
        let logged_subject = subject.clone();
        self.inner
            .patch_convo(user_id, convo_id, subject)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    convo_id,
                    subject = ?logged_subject,
                    error = %error,
                    "patch_convo failed"
                )
            })
    }

    async fn patch_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
        patch: MessagePatch,
    ) -> Result<Outcome> {
        let is_read = patch.is_read;
        let body_len = patch.body.as_ref().map(|body| body.chars().count());
        self.inner
            .patch_message(user_id, convo_id, message_id, patch)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    convo_id,
                    message_id,
                    is_read = ?is_read,
                    body_len = ?body_len,
                    error = %error,
                    "patch_message failed"
                )
            })
    }
}
