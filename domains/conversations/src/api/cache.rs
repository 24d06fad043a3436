//! Response cache around the Contract Layer
//!
//! Successful reads are stored whole and replayed on an identical request.
//! A successful PATCH or DELETE drops every entry under the resource path,
//! plus the pages of the list the resource appears in. Creation invalidates
//! nothing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::Method;
use convos_common::Result;
use dashmap::DashMap;

use super::contract::ConvoContract;
use super::request::RequestContext;
use super::response::ApiResponse;
use crate::domain::entities::{MessagePatch, NewConvo, NewMessage};

/// Identity of a cacheable request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub caller: String,
}

impl CacheKey {
    pub fn for_request(ctx: &RequestContext) -> Self {
        Self {
            method: ctx.method.clone(),
            path: ctx.path.clone(),
            query: ctx.query.clone(),
            caller: ctx.caller_header.clone(),
        }
    }

    /// Whether this entry lives at `path` or beneath it
    fn under(&self, path: &str) -> bool {
        self.path
            .strip_prefix(path)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Storage for whole responses
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<ApiResponse>;

    async fn put(&self, key: CacheKey, response: ApiResponse, ttl: Duration);

    /// Remove every entry stored for `path` or a sub-path, any query, any caller
    async fn remove_resource(&self, path: &str);

    /// Remove entries stored for exactly `path`, any query, any caller
    async fn remove_path(&self, path: &str);
}

struct Entry {
    response: ApiResponse,
    expires_at: Instant,
}

/// Process-local cache; expired entries are dropped on access
#[derive(Default)]
pub struct MemoryResponseCache {
    entries: DashMap<CacheKey, Entry>,
}

impl MemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResponseCache for MemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Option<ApiResponse> {
        let now = Instant::now();
        let found = self
            .entries
            .get(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.response.clone()));

        match found {
            Some(Some(response)) => Some(response),
            Some(None) => {
                self.entries
                    .remove_if(key, |_, entry| entry.expires_at <= now);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: CacheKey, response: ApiResponse, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(
            key,
            Entry {
                response,
                expires_at,
            },
        );
    }

    async fn remove_resource(&self, path: &str) {
        self.entries.retain(|key, _| !key.under(path));
    }

    async fn remove_path(&self, path: &str) {
        self.entries.retain(|key, _| key.path != path);
    }
}

/// Caching decorator for any `ConvoContract`
pub struct CachedContract<C> {
    inner: C,
    cache: Arc<dyn ResponseCache>,
    ttl: Duration,
}

impl<C: ConvoContract> CachedContract<C> {
    pub fn new(inner: C, cache: Arc<dyn ResponseCache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    async fn read<F>(&self, ctx: &RequestContext, load: F) -> Result<ApiResponse>
    where
        F: std::future::Future<Output = Result<ApiResponse>> + Send,
    {
        let key = CacheKey::for_request(ctx);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(path = %key.path, query = %key.query, "Response cache hit");
            return Ok(hit);
        }

        let response = load.await?;
        if response.is_success() {
            tracing::debug!(path = %key.path, query = %key.query, "Response cache store");
            self.cache.put(key, response.clone(), self.ttl).await;
        }
        Ok(response)
    }

    async fn invalidate(&self, ctx: &RequestContext, response: &ApiResponse) {
        if response.is_success() {
            tracing::debug!(path = %ctx.path, "Response cache invalidate");
            self.cache.remove_resource(&ctx.path).await;
            if let Some((list_path, _)) = ctx.path.rsplit_once('/') {
                self.cache.remove_path(list_path).await;
            }
        }
    }
}

#[async_trait]
impl<C: ConvoContract> ConvoContract for CachedContract<C> {
    async fn list_convos(&self, ctx: &RequestContext) -> Result<ApiResponse> {
        self.read(ctx, self.inner.list_convos(ctx)).await
    }

    async fn get_convo(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse> {
        self.read(ctx, self.inner.get_convo(ctx, convo_id)).await
    }

    async fn create_convo(&self, ctx: &RequestContext, convo: NewConvo) -> Result<ApiResponse> {
        self.inner.create_convo(ctx, convo).await
    }

    async fn patch_convo(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        subject: Option<String>,
    ) -> Result<ApiResponse> {
        let response = self.inner.patch_convo(ctx, convo_id, subject).await?;
        self.invalidate(ctx, &response).await;
        Ok(response)
    }

    async fn delete_convo(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse> {
        let response = self.inner.delete_convo(ctx, convo_id).await?;
        self.invalidate(ctx, &response).await;
        Ok(response)
    }

    async fn list_messages(&self, ctx: &RequestContext, convo_id: i64) -> Result<ApiResponse> {
        self.read(ctx, self.inner.list_messages(ctx, convo_id)).await
    }

    async fn get_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
    ) -> Result<ApiResponse> {
        self.read(ctx, self.inner.get_message(ctx, convo_id, message_id))
            .await
    }

    async fn create_message(
        &self,
        ctx: &RequestContext,
        message: NewMessage,
    ) -> Result<ApiResponse> {
        self.inner.create_message(ctx, message).await
    }

    async fn patch_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
        patch: MessagePatch,
    ) -> Result<ApiResponse> {
        let response = self
            .inner
            .patch_message(ctx, convo_id, message_id, patch)
            .await?;
        self.invalidate(ctx, &response).await;
        Ok(response)
    }

    async fn delete_message(
        &self,
        ctx: &RequestContext,
        convo_id: i64,
        message_id: i64,
    ) -> Result<ApiResponse> {
        let response = self
            .inner
            .delete_message(ctx, convo_id, message_id)
            .await?;
        self.invalidate(ctx, &response).await;
        Ok(response)
    }
}
