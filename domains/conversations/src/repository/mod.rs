//! Persistence contract for the Conversations domain
//!
//! The store executes one named operation per call with a keyed parameter
//! map. It answers with a status (code + message) and, for reads, a set of
//! row tables ordered as `[primary rows, {Total}, {MaxCreated}]`.

pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;

use async_trait::async_trait;
use convos_common::{Error, Result, ResultCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Parameter name to value, sent to the store as one JSON object
pub type Params = BTreeMap<&'static str, Value>;

/// Persisted operations the domain can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DeleteConvo,
    DeleteMessage,
    ListConvos,
    ListMessages,
    GetConvo,
    GetMessages,
    InsertConvo,
    InsertMessage,
    PatchConvo,
    PatchMessage,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::DeleteConvo,
        Operation::DeleteMessage,
        Operation::ListConvos,
        Operation::ListMessages,
        Operation::GetConvo,
        Operation::GetMessages,
        Operation::InsertConvo,
        Operation::InsertMessage,
        Operation::PatchConvo,
        Operation::PatchMessage,
    ];

    /// Name of the stored procedure backing this operation
    pub fn procedure(self) -> &'static str {
        match self {
            Operation::DeleteConvo => "usp_ConvoEntity_Delete",
            Operation::DeleteMessage => "usp_MessageEntity_Delete",
            Operation::ListConvos => "usp_ConvoEntity_GetAll",
            Operation::ListMessages => "usp_MessageEntity_GetAll",
            Operation::GetConvo => "usp_ConvoEntity_GetById",
            Operation::GetMessages => "usp_MessageEntity_GetByIds",
            Operation::InsertConvo => "usp_ConvoEntity_Insert",
            Operation::InsertMessage => "usp_MessageEntity_Insert",
            Operation::PatchConvo => "usp_ConvoEntity_Patch",
            Operation::PatchMessage => "usp_MessageEntity_Patch",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.procedure())
    }
}

/// Status half of every store reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub code: ResultCode,
    pub message: String,
}

impl StoreStatus {
    pub fn new(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Decode a raw numeric code; codes outside the taxonomy become UNKNOWN
    pub fn from_raw(code: Option<i32>, message: Option<String>) -> Self {
        Self {
            code: code
                .and_then(ResultCode::from_code)
                .unwrap_or(ResultCode::Unknown),
            message: message.unwrap_or_default(),
        }
    }
}

/// Status plus row tables
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResults {
    pub status: StoreStatus,
    pub tables: Vec<Vec<Value>>,
}

impl StoreResults {
    pub fn new(status: StoreStatus, tables: Vec<Vec<Value>>) -> Self {
        Self { status, tables }
    }

    /// Status only, no tables
    pub fn empty(status: StoreStatus) -> Self {
        Self::new(status, Vec::new())
    }

    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    /// Deserialize every row of a table; a missing table yields no rows
    pub fn rows<T: DeserializeOwned>(&self, table: usize) -> Result<Vec<T>> {
        self.tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .cloned()
                    .map(serde_json::from_value)
                    .collect::<std::result::Result<Vec<T>, _>>()
            })
            .transpose()
            .map(Option::unwrap_or_default)
            .map_err(Error::from)
    }

    /// Deserialize the first row of a table, if any
    pub fn first_row<T: DeserializeOwned>(&self, table: usize) -> Result<Option<T>> {
        self.tables
            .get(table)
            .and_then(|rows| rows.first())
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }
}

/// Executes persisted operations.
///
/// An `Err` is a fault (connection lost, malformed reply). Business failures
/// such as a missing entity come back as a non-OK `StoreStatus`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run an operation that reports a status only
    async fn execute(&self, operation: Operation, params: Params) -> Result<StoreStatus>;

    /// Run an operation that also returns row tables
    async fn execute_with_results(
        &self,
        operation: Operation,
        params: Params,
    ) -> Result<StoreResults>;
}
