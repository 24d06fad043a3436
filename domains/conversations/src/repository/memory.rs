//! In-process store
//!
//! Emulates the persisted procedures over process-local tables. Used when no
//! database is configured and by tests. Rows are produced in the same shape
//! the Postgres functions return.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use convos_common::{Error, Result, ResultCode};
use serde_json::{json, Value};

use super::{Operation, Params, Store, StoreResults, StoreStatus};
use crate::domain::entities::{Conversation, Message};
use crate::domain::timestamps::{self, format_sortable};

const CONVO_NOT_FOUND: &str = "Convo not found";
const MESSAGE_NOT_FOUND: &str = "Message not found";

#[derive(Default)]
struct Tables {
    convos: BTreeMap<i64, Conversation>,
    messages: BTreeMap<i64, Message>,
    last_convo_id: i64,
    last_message_id: i64,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps, so cursors never tie
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn visible_convo(&self, convo_id: i64, user_id: i64) -> Option<&Conversation> {
        self.convos
            .get(&convo_id)
            .filter(|convo| convo.includes(user_id))
    }

    fn message_in(&self, convo_id: i64, message_id: i64) -> Option<&Message> {
        self.messages
            .get(&message_id)
            .filter(|message| message.convo_id == convo_id)
    }
}

/// Process-local `Store`
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    fn run(&self, operation: Operation, params: &Params) -> Result<StoreResults> {
        let mut tables = self.lock()?;
        match operation {
            Operation::InsertConvo => insert_convo(&mut tables, params),
            Operation::GetConvo => get_convo(&tables, params),
            Operation::ListConvos => list_convos(&tables, params),
            Operation::PatchConvo => patch_convo(&mut tables, params),
            Operation::DeleteConvo => delete_convo(&mut tables, params),
            Operation::InsertMessage => insert_message(&mut tables, params),
            Operation::GetMessages => get_messages(&tables, params),
            Operation::ListMessages => list_messages(&tables, params),
            Operation::PatchMessage => patch_message(&mut tables, params),
            Operation::DeleteMessage => delete_message(&mut tables, params),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn execute(&self, operation: Operation, params: Params) -> Result<StoreStatus> {
        self.run(operation, &params).map(|results| results.status)
    }

    async fn execute_with_results(
        &self,
        operation: Operation,
        params: Params,
    ) -> Result<StoreResults> {
        self.run(operation, &params)
    }
}

fn status(code: ResultCode, message: &str) -> StoreResults {
    StoreResults::empty(StoreStatus::new(code, message))
}

fn missing(name: &str) -> Error {
    Error::Store(format!("missing or malformed parameter {}", name))
}

fn int_param(params: &Params, name: &str) -> Result<i64> {
    params
        .get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| missing(name))
}

fn opt_int_param(params: &Params, name: &str) -> Result<Option<i64>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| missing(name)),
    }
}

fn opt_text_param(params: &Params, name: &str) -> Result<Option<String>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(missing(name)),
    }
}

fn opt_bool_param(params: &Params, name: &str) -> Result<Option<bool>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| missing(name)),
    }
}

fn timestamp_param(params: &Params, name: &str) -> Result<DateTime<Utc>> {
    params
        .get(name)
        .and_then(Value::as_str)
        .and_then(timestamps::parse_timestamp)
        .ok_or_else(|| missing(name))
}

fn ids_param(params: &Params, name: &str) -> Result<Vec<i64>> {
    params
        .get(name)
        .and_then(Value::as_array)
        .ok_or_else(|| missing(name))?
        .iter()
        .map(|id| id.as_i64().ok_or_else(|| missing(name)))
        .collect()
}

fn row<T: serde::Serialize>(entity: &T) -> Result<Value> {
    Ok(serde_json::to_value(entity)?)
}

fn message_row(message: &Message, level: i32) -> Result<Value> {
    let mut value = row(message)?;
    if let Value::Object(fields) = &mut value {
        fields.insert("Level".to_string(), json!(level));
    }
    Ok(value)
}

/// Page rows plus the `{Total}` and `{MaxCreated}` tables
fn page_tables(
    rows: Vec<Value>,
    total: usize,
    max_created: Option<DateTime<Utc>>,
) -> Vec<Vec<Value>> {
    vec![
        rows,
        vec![json!({ "Total": total })],
        vec![json!({ "MaxCreated": max_created.map(format_sortable) })],
    ]
}

fn page_bounds(params: &Params, len: usize) -> Result<(usize, usize)> {
    let count = usize::try_from(int_param(params, "Count")?).unwrap_or(0);
    let index = usize::try_from(int_param(params, "Index")?).unwrap_or(0);
    Ok((index.saturating_mul(count).min(len), count))
}

fn insert_convo(tables: &mut Tables, params: &Params) -> Result<StoreResults> {
    let creator = int_param(params, "Creator")?;
    let participant = int_param(params, "Participant")?;
    let subject = opt_text_param(params, "Subject")?;

    let now = tables.tick();
    tables.last_convo_id += 1;
    let id = tables.last_convo_id;
    tables.convos.insert(
        id,
        Conversation {
            id,
            creator,
            participant,
            subject,
            date_created: now,
            date_of_last_message: None,
            date_updated: now,
            num_messages: 0,
        },
    );

    Ok(StoreResults::new(
        StoreStatus::new(ResultCode::Created, ""),
        vec![vec![json!({ "Id": id })]],
    ))
}

fn get_convo(tables: &Tables, params: &Params) -> Result<StoreResults> {
    let convo_id = int_param(params, "ConvoId")?;
    let user_id = int_param(params, "UserId")?;

    match tables.visible_convo(convo_id, user_id) {
        Some(convo) => Ok(StoreResults::new(
            StoreStatus::new(ResultCode::Ok, ""),
            vec![vec![row(convo)?]],
        )),
        None => Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND)),
    }
}

fn list_convos(tables: &Tables, params: &Params) -> Result<StoreResults> {
    let before = timestamp_param(params, "Before")?;
    let user_id = int_param(params, "UserId")?;

    let activity = |convo: &Conversation| convo.date_of_last_message.unwrap_or(convo.date_created);
    let mut matching: Vec<&Conversation> = tables
        .convos
        .values()
        .filter(|convo| convo.includes(user_id) && activity(convo) < before)
        .collect();
    matching.sort_by(|a, b| activity(b).cmp(&activity(a)).then(b.id.cmp(&a.id)));

    let max_created = matching.iter().map(|convo| convo.date_created).max();
    let (skip, count) = page_bounds(params, matching.len())?;
    let rows = matching
        .iter()
        .skip(skip)
        .take(count)
        .map(|convo| row(*convo))
        .collect::<Result<Vec<_>>>()?;

    let code = if rows.is_empty() {
        ResultCode::NoResults
    } else {
        ResultCode::Ok
    };
    Ok(StoreResults::new(
        StoreStatus::new(code, ""),
        page_tables(rows, matching.len(), max_created),
    ))
}

fn patch_convo(tables: &mut Tables, params: &Params) -> Result<StoreResults> {
    let convo_id = int_param(params, "Id")?;
    let subject = opt_text_param(params, "Subject")?;
    let user_id = int_param(params, "UserId")?;

    if tables.visible_convo(convo_id, user_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND));
    }
    let now = tables.tick();
    if let Some(convo) = tables.convos.get_mut(&convo_id) {
        if subject.is_some() {
            convo.subject = subject;
        }
        convo.date_updated = now;
    }
    Ok(status(ResultCode::Ok, ""))
}

fn delete_convo(tables: &mut Tables, params: &Params) -> Result<StoreResults> {
    let convo_id = int_param(params, "Id")?;
    let user_id = int_param(params, "UserId")?;

    if tables.visible_convo(convo_id, user_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND));
    }
    tables.convos.remove(&convo_id);
    tables
        .messages
        .retain(|_, message| message.convo_id != convo_id);
    Ok(status(ResultCode::Deleted, ""))
}

fn insert_message(tables: &mut Tables, params: &Params) -> Result<StoreResults> {
    let body = opt_text_param(params, "Body")?;
    let convo_id = int_param(params, "ConvoId")?;
    let recipient = int_param(params, "Recipient")?;
    let parent = opt_int_param(params, "Parent")?;
    let sender = int_param(params, "Sender")?;

    let Some(convo) = tables.visible_convo(convo_id, sender) else {
        return Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND));
    };
    if !convo.includes(recipient) {
        return Ok(status(
            ResultCode::InvalidInputData,
            "The recipient is not part of the convo",
        ));
    }
    if let Some(parent_id) = parent {
        if tables.message_in(convo_id, parent_id).is_none() {
            return Ok(status(
                ResultCode::EntityNotFound,
                "Parent message not found",
            ));
        }
    }

    let now = tables.tick();
    tables.last_message_id += 1;
    let id = tables.last_message_id;
    tables.messages.insert(
        id,
        Message {
            id,
            convo_id,
            sender,
            recipient,
            parent,
            body,
            is_read: false,
            date_created: now,
            date_updated: now,
            thread: None,
        },
    );
    if let Some(convo) = tables.convos.get_mut(&convo_id) {
        convo.date_of_last_message = Some(now);
        convo.num_messages += 1;
    }

    Ok(StoreResults::new(
        StoreStatus::new(ResultCode::Created, ""),
        vec![vec![json!({ "Id": id })]],
    ))
}

fn get_messages(tables: &Tables, params: &Params) -> Result<StoreResults> {
    let convo_id = int_param(params, "ConvoId")?;
    let message_ids = ids_param(params, "MessageIds")?;
    let user_id = int_param(params, "UserId")?;

    if tables.visible_convo(convo_id, user_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND));
    }

    let mut rows = Vec::new();
    let mut seen = Vec::new();
    for message_id in message_ids {
        let Some(message) = tables.message_in(convo_id, message_id) else {
            return Ok(status(ResultCode::EntityNotFound, MESSAGE_NOT_FOUND));
        };
        rows.push(message_row(message, 0)?);
        seen.push(message.id);

        // Ancestors, nearest first
        let mut level = 1;
        let mut next = message.parent;
        while let Some(parent_id) = next {
            if seen.contains(&parent_id) {
                break;
            }
            let Some(parent) = tables.message_in(convo_id, parent_id) else {
                break;
            };
            rows.push(message_row(parent, level)?);
            seen.push(parent.id);
            level += 1;
            next = parent.parent;
        }
    }

    Ok(StoreResults::new(
        StoreStatus::new(ResultCode::Ok, ""),
        vec![rows],
    ))
}

fn list_messages(tables: &Tables, params: &Params) -> Result<StoreResults> {
    let before = timestamp_param(params, "Before")?;
    let convo_id = int_param(params, "ConvoId")?;
    let user_id = int_param(params, "UserId")?;

    if tables.visible_convo(convo_id, user_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND));
    }

    let mut matching: Vec<&Message> = tables
        .messages
        .values()
        .filter(|message| message.convo_id == convo_id && message.date_created < before)
        .collect();
    matching.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));

    let max_created = matching.first().map(|message| message.date_created);
    let (skip, count) = page_bounds(params, matching.len())?;
    let rows = matching
        .iter()
        .skip(skip)
        .take(count)
        .map(|message| message_row(message, 0))
        .collect::<Result<Vec<_>>>()?;

    let code = if rows.is_empty() {
        ResultCode::NoResults
    } else {
        ResultCode::Ok
    };
    Ok(StoreResults::new(
        StoreStatus::new(code, ""),
        page_tables(rows, matching.len(), max_created),
    ))
}

fn patch_message(tables: &mut Tables, params: &Params) -> Result<StoreResults> {
    let message_id = int_param(params, "Id")?;
    let body = opt_text_param(params, "Body")?;
    let convo_id = int_param(params, "ConvoId")?;
    let is_read = opt_bool_param(params, "IsRead")?;
    let user_id = int_param(params, "UserId")?;

    if tables.visible_convo(convo_id, user_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND));
    }
    if tables.message_in(convo_id, message_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, MESSAGE_NOT_FOUND));
    }

    let now = tables.tick();
    if let Some(message) = tables.messages.get_mut(&message_id) {
        if body.is_some() {
            message.body = body;
        }
        if let Some(is_read) = is_read {
            message.is_read = is_read;
        }
        message.date_updated = now;
    }
    Ok(status(ResultCode::Ok, ""))
}

fn delete_message(tables: &mut Tables, params: &Params) -> Result<StoreResults> {
    let message_id = int_param(params, "Id")?;
    let convo_id = int_param(params, "ConvoId")?;
    let user_id = int_param(params, "UserId")?;

    if tables.visible_convo(convo_id, user_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, CONVO_NOT_FOUND));
    }
    if tables.message_in(convo_id, message_id).is_none() {
        return Ok(status(ResultCode::EntityNotFound, MESSAGE_NOT_FOUND));
    }

    tables.messages.remove(&message_id);
    if let Some(convo) = tables.convos.get_mut(&convo_id) {
        convo.num_messages = (convo.num_messages - 1).max(0);
    }
    Ok(status(ResultCode::Deleted, ""))
}
