//! Postgres-backed store
//!
//! Each operation is a Postgres function taking a single `jsonb` argument
//! and returning one row `(result_code int, message text, tables jsonb)`.

use async_trait::async_trait;
use convos_common::Result;
use serde_json::Value;
use sqlx::{types::Json, PgPool};

use super::{Operation, Params, Store, StoreResults, StoreStatus};

type ReplyRow = (Option<i32>, Option<String>, Option<Json<Vec<Vec<Value>>>>);

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn call(&self, operation: Operation, params: Params) -> Result<ReplyRow> {
        let sql = statement(operation);
        tracing::debug!(procedure = %operation, "Calling store procedure");

        let row = sqlx::query_as::<_, ReplyRow>(&sql)
            .bind(Json(params))
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }
}

/// Procedure names come from the closed `Operation` set, never from input
fn statement(operation: Operation) -> String {
    format!(
        r#"SELECT result_code, message, tables FROM "{}"($1::jsonb)"#,
        operation.procedure()
    )
}

#[async_trait]
impl Store for PgStore {
    async fn execute(&self, operation: Operation, params: Params) -> Result<StoreStatus> {
        let (code, message, _) = self.call(operation, params).await?;
        Ok(StoreStatus::from_raw(code, message))
    }

    async fn execute_with_results(
        &self,
        operation: Operation,
        params: Params,
    ) -> Result<StoreResults> {
        let (code, message, tables) = self.call(operation, params).await?;
        Ok(StoreResults::new(
            StoreStatus::from_raw(code, message),
            tables.map(|Json(tables)| tables).unwrap_or_default(),
        ))
    }
}
