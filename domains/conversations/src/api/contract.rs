//! Contract Layer: HTTP semantics over the Domain Manager
//!
//! Resolves the caller and paging parameters, delegates to the manager and
//! shapes the outcome into a complete `ApiResponse`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convos_common::{headers, CacheConfig, Config, Outcome, PagingConfig, Result, ResultCode};

use super::request::RequestContext;
use super::response::ApiResponse;
use crate::domain::entities::{MessagePatch, NewConvo, NewMessage, PageQuery};
use crate::domain::timestamps::format_sortable;
use crate::manager::{ConvoManager, Page};

/// One operation per verb and resource
#[async_trait]
pub trait ConvoContract: Send + Sync {
    async fn list_convos(&self, ctx: &RequestContext) -> Result<ApiResponse>;

    async fn get_convo(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse>;

    async fn create_convo(&self, ctx: &RequestContext, convo: NewConvo) -> Result<ApiResponse>;

    async fn patch_convo(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        subject: Option<String>,
    ) -> Result<ApiResponse>;

    async fn delete_convo(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse>;

    async fn list_messages(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse>;

    async fn get_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
    ) -> Result<ApiResponse>;

    async fn create_message(
        &self,
        ctx: &RequestContext,
        message: NewMessage,
    ) -> Result<ApiResponse>;

    async fn patch_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
        patch: MessagePatch,
    ) -> Result<ApiResponse>;

    async fn delete_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
    ) -> Result<ApiResponse>;
}

/// Contract Layer over any `ConvoManager`
pub struct HttpContract<M> {
    manager: M,
    base_uri: String,
    cache: CacheConfig,
    paging: PagingConfig,
}

impl<M: ConvoManager> HttpContract<M> {
    pub fn new(manager: M, config: &Config) -> Self {
        Self {
            manager,
            base_uri: config.base_uri.clone(),
            cache: config.cache,
            paging: config.paging,
        }
    }

    fn convos_uri(&self) -> String {
        format!("{}/api/Convo", self.base_uri)
    }

    fn messages_uri(&self, convo_id: i64) -> String {
        format!("{}/api/Convo/{}/Message", self.base_uri, convo_id)
    }
}

/// List response: counts, next-page link and last-modified on success
fn page_response<T: serde::Serialize>(
    page: &Page<T>,
    query: &PageQuery,
    list_uri: &str,
    cursor: impl Fn(&T) -> Option<DateTime<Utc>>,
    max_age: u32,
) -> Result<ApiResponse> {
    let response = ApiResponse::from_outcome(&page.outcome);
    if !response.is_success() {
        return Ok(response);
    }

    let mut response = response
        .number_header(headers::TOTAL_COUNT, page.total)
        .number_header(headers::RELATIVE_COUNT, page.items.len() as i64)
        .text_header(headers::LAST_MODIFIED, &format_sortable(page.max_created))
        .cache_control(max_age);

    if query.has_next_page(page.total) {
        let next_cursor = page
            .items
            .iter()
            .filter_map(cursor)
            .min()
            .unwrap_or(query.before);
        let link = format!(
            "{}?index={}&count={}&before={}",
            list_uri,
            query.index.saturating_add(1),
            query.count,
            urlencoding::encode(&format_sortable(next_cursor))
        );
        response = response.text_header(headers::NEXT_PAGE, &link);
    }

    response.json(&page.items)
}

fn rejected(outcome: Outcome) -> Result<ApiResponse> {
    Ok(ApiResponse::from_outcome(&outcome))
}

#[async_trait]
impl<M: ConvoManager> ConvoContract for HttpContract<M> {
    async fn list_convos(&self, ctx: &RequestContext) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };
        let query = match ctx.page_query(&self.paging) {
            Ok(query) => query,
            Err(outcome) => return rejected(outcome),
        };

        let page = self.manager.list_convos(user_id, query).await?;
        page_response(
            &page,
            &query,
            &self.convos_uri(),
            |convo| convo.date_of_last_message,
            self.cache.convo_list_max_age,
        )
    }

    async fn get_convo(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let reply = self.manager.get_convo(user_id, convo_id).await?;
        let response = ApiResponse::from_outcome(&reply.outcome);
        match reply.value {
            Some(convo) if response.is_success() => response
                .text_header(headers::LAST_MODIFIED, &format_sortable(convo.date_updated))
                .cache_control(self.cache.convo_max_age)
                .json(&convo),
            _ => Ok(response),
        }
    }

    async fn create_convo(&self, ctx: &RequestContext, convo: NewConvo) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let reply = self.manager.create_convo(user_id, convo).await?;
        let response = ApiResponse::from_outcome(&reply.outcome);
        match reply.value {
            Some(id) if reply.outcome.is(ResultCode::Created) => Ok(response.text_header(
                headers::LOCATION,
                &format!("{}/{}", self.convos_uri(), id),
            )),
            _ => Ok(response),
        }
    }

    async fn patch_convo(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        subject: Option<String>,
    ) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let outcome = self.manager.patch_convo(user_id, convo_id, subject).await?;
        Ok(ApiResponse::from_outcome(&outcome))
    }

    async fn delete_convo(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let outcome = self.manager.delete_convo(user_id, convo_id).await?;
        Ok(ApiResponse::from_outcome(&outcome))
    }

    async fn list_messages(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };
        let query = match ctx.page_query(&self.paging) {
            Ok(query) => query,
            Err(outcome) => return rejected(outcome),
        };

        let page = self.manager.list_messages(user_id, convo_id, query).await?;
        page_response(
            &page,
            &query,
            &self.messages_uri(convo_id),
            |message| Some(message.date_created),
            self.cache.message_list_max_age,
        )
    }

    async fn get_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
    ) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let reply = self
            .manager
            .get_message(user_id, convo_id, message_id)
            .await?;
        let response = ApiResponse::from_outcome(&reply.outcome);
        match reply.value {
            Some(message) if response.is_success() => response
                .text_header(headers::LAST_MODIFIED, &format_sortable(message.date_updated))
                .cache_control(self.cache.message_max_age)
                .json(&message),
            _ => Ok(response),
        }
    }

    async fn create_message(
        &self,
        ctx: &RequestContext,
        message: NewMessage,
    ) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let convo_id = message.convo_id;
        let reply = self.manager.create_message(user_id, message).await?;
        let response = ApiResponse::from_outcome(&reply.outcome);
        match reply.value {
            Some(id) if reply.outcome.is(ResultCode::Created) => Ok(response.text_header(
                headers::LOCATION,
                &format!("{}/{}", self.messages_uri(convo_id), id),
            )),
            _ => Ok(response),
        }
    }

    async fn patch_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
        patch: MessagePatch,
    ) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let outcome = self
            .manager
            .patch_message(user_id, convo_id, message_id, patch)
            .await?;
        Ok(ApiResponse::from_outcome(&outcome))
    }

    async fn delete_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
    ) -> Result<ApiResponse> {
        let user_id = match ctx.caller() {
            Ok(user_id) => user_id,
            Err(outcome) => return rejected(outcome),
        };

        let outcome = self
            .manager
            .delete_message(user_id, convo_id, message_id)
            .await?;
        Ok(ApiResponse::from_outcome(&outcome))
    }
}
