//! Store-backed Domain Manager

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use convos_common::{Error, Outcome, PagingConfig, Result, ResultCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{ConvoManager, Page, Reply};
use crate::domain::entities::{
    Conversation, Message, MessagePatch, MessageRow, NewConvo, NewMessage, PageQuery,
};
use crate::domain::thread;
use crate::domain::timestamps::{self, timestamp_floor};
use crate::domain::validation::Validation;
use crate::repository::{Operation, Params, Store, StoreStatus};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TotalRow {
    total: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MaxCreatedRow {
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    max_created: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InsertedRow {
    id: i64,
}

/// Domain Manager over a `Store`
#[derive(Clone)]
pub struct StoreConvoManager {
    store: Arc<dyn Store>,
    max_page_size: i32,
}

impl StoreConvoManager {
    pub fn new(store: Arc<dyn Store>, paging: PagingConfig) -> Self {
        Self {
            store,
            max_page_size: paging.max_size,
        }
    }

    fn check_page<'a>(&self, validation: Validation<'a>, query: &PageQuery) -> Validation<'a> {
        validation
            .range(query.count, "Count", 0, self.max_page_size)
            .range(query.index, "Index", 0, i32::MAX)
    }

    async fn status(&self, operation: Operation, params: Params) -> Result<Outcome> {
        let status = self.store.execute(operation, params).await?;
        Ok(outcome_of(status))
    }

    async fn page<T: DeserializeOwned>(
        &self,
        operation: Operation,
        params: Params,
    ) -> Result<Page<T>> {
        let results = self.store.execute_with_results(operation, params).await?;
        let mut page = Page::empty(outcome_of(results.status.clone()));
        if results.has_tables() {
            page.items = results.rows(0)?;
            page.total = results
                .first_row::<TotalRow>(1)?
                .map(|row| row.total)
                .unwrap_or(0);
            page.max_created = results
                .first_row::<MaxCreatedRow>(2)?
                .and_then(|row| row.max_created)
                .unwrap_or_else(timestamp_floor);
        }
        Ok(page)
    }

    async fn insert(&self, operation: Operation, params: Params) -> Result<Reply<i64>> {
        let results = self.store.execute_with_results(operation, params).await?;
        let outcome = outcome_of(results.status.clone());
        if !outcome.is(ResultCode::Created) {
            return Ok(Reply::bare(outcome));
        }

        let id = results
            .first_row::<InsertedRow>(0)?
            .map(|row| row.id)
            .filter(|id| *id > 0)
            .ok_or_else(|| Error::Store(format!("{} returned no identity", operation)))?;
        Ok(Reply::new(outcome, Some(id)))
    }
}

/// Store status becomes the outcome, message kept verbatim
fn outcome_of(status: StoreStatus) -> Outcome {
    let mut outcome = Outcome::with_code(status.code);
    if !status.message.is_empty() {
        outcome.add_message(status.message);
    }
    outcome
}

fn cursor(before: DateTime<Utc>) -> serde_json::Value {
    json!(before.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[async_trait]
impl ConvoManager for StoreConvoManager {
    async fn delete_convo(&self, user_id: i64, convo_id: i64) -> Result<Outcome> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .id(convo_id, "Convo")
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(outcome);
        }

        self.status(
            Operation::DeleteConvo,
            Params::from([("Id", json!(convo_id)), ("UserId", json!(user_id))]),
        )
        .await
    }

    async fn delete_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
    ) -> Result<Outcome> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .id(convo_id, "Convo")
            .id(message_id, "Message")
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(outcome);
        }

        self.status(
            Operation::DeleteMessage,
            Params::from([
                ("Id", json!(message_id)),
                ("ConvoId", json!(convo_id)),
                ("UserId", json!(user_id)),
            ]),
        )
        .await
    }

    async fn list_convos(&self, user_id: i64, query: PageQuery) -> Result<Page<Conversation>> {
        let mut outcome = Outcome::new();
        let valid = self
            .check_page(Validation::new(&mut outcome), &query)
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(Page::empty(outcome));
        }

        self.page(
            Operation::ListConvos,
            Params::from([
                ("Before", cursor(query.before)),
                ("Count", json!(query.count)),
                ("Index", json!(query.index)),
                ("UserId", json!(user_id)),
            ]),
        )
        .await
    }

    async fn get_convo(&self, user_id: i64, convo_id: i64) -> Result<Reply<Conversation>> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .id(convo_id, "Convo")
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(Reply::bare(outcome));
        }

        let results = self
            .store
            .execute_with_results(
                Operation::GetConvo,
                Params::from([("ConvoId", json!(convo_id)), ("UserId", json!(user_id))]),
            )
            .await?;
        let convo = results.first_row::<Conversation>(0)?;
        Ok(Reply::new(outcome_of(results.status), convo))
    }

    async fn list_messages(
        &self,
        user_id: i64,
        convo_id: i64,
        query: PageQuery,
    ) -> Result<Page<Message>> {
        let mut outcome = Outcome::new();
        let validation = Validation::new(&mut outcome).id(convo_id, "Convo");
        let valid = self
            .check_page(validation, &query)
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(Page::empty(outcome));
        }

        self.page(
            Operation::ListMessages,
            Params::from([
                ("Before", cursor(query.before)),
                ("Count", json!(query.count)),
                ("Index", json!(query.index)),
                ("ConvoId", json!(convo_id)),
                ("UserId", json!(user_id)),
            ]),
        )
        .await
    }

    async fn get_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
    ) -> Result<Reply<Message>> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .id(convo_id, "Convo")
            .id(message_id, "Message")
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(Reply::bare(outcome));
        }

        let results = self
            .store
            .execute_with_results(
                Operation::GetMessages,
                Params::from([
                    ("ConvoId", json!(convo_id)),
                    ("MessageIds", json!([message_id])),
                    ("UserId", json!(user_id)),
                ]),
            )
            .await?;
        let rows = results.rows::<MessageRow>(0)?;
        let message = thread::reconstruct(rows).into_iter().next();
        Ok(Reply::new(outcome_of(results.status), message))
    }

    async fn create_convo(&self, user_id: i64, convo: NewConvo) -> Result<Reply<i64>> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .subject(convo.subject.as_deref())
            .id(convo.participant, "Participant")
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(Reply::bare(outcome));
        }

        self.insert(
            Operation::InsertConvo,
            Params::from([
                ("Creator", json!(user_id)),
                ("Participant", json!(convo.participant)),
                ("Subject", json!(convo.subject)),
            ]),
        )
        .await
    }

    async fn create_message(&self, user_id: i64, message: NewMessage) -> Result<Reply<i64>> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .body(message.body.as_deref())
            .id(message.convo_id, "Convo")
            .optional_id(message.parent, "Parent")
            .id(message.recipient, "Recipient")
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(Reply::bare(outcome));
        }

        self.insert(
            Operation::InsertMessage,
            Params::from([
                ("Body", json!(message.body)),
                ("ConvoId", json!(message.convo_id)),
                ("Recipient", json!(message.recipient)),
                ("Parent", json!(message.parent)),
                ("Sender", json!(user_id)),
            ]),
        )
        .await
    }

    async fn patch_convo(
        &self,
        user_id: i64,
        convo_id: i64,
        subject: Option<String>,
    ) -> Result<Outcome> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .id(convo_id, "Convo")
            .subject(subject.as_deref())
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(outcome);
        }

        self.status(
            Operation::PatchConvo,
            Params::from([
                ("Id", json!(convo_id)),
                ("Subject", json!(subject)),
                ("UserId", json!(user_id)),
            ]),
        )
        .await
    }

    async fn patch_message(
        &self,
        user_id: i64,
        convo_id: i64,
        message_id: i64,
        patch: MessagePatch,
    ) -> Result<Outcome> {
        let mut outcome = Outcome::new();
        let valid = Validation::new(&mut outcome)
            .id(convo_id, "Convo")
            .id(message_id, "Message")
            .body(patch.body.as_deref())
            .id(user_id, "User")
            .finish();
        if !valid {
            return Ok(outcome);
        }

        self.status(
            Operation::PatchMessage,
            Params::from([
                ("Id", json!(message_id)),
                ("Body", json!(patch.body)),
                ("ConvoId", json!(convo_id)),
                ("IsRead", json!(patch.is_read)),
                ("UserId", json!(user_id)),
            ]),
        )
        .await
    }
}
