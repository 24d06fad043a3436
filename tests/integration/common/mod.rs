//! Common test utilities and fixtures for integration tests
//!
//! This module provides shared infrastructure for all integration tests:
//! - A fully wired router over the in-memory store
//! - A store wrapper counting persistence calls
//! - Request builders and response helpers
//! - Conversation and message fixtures

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use convos_common::{headers, Config, Result};
use convos_conversations::{MemoryStore, Operation, Params, Store, StoreResults, StoreStatus};
use serde_json::Value;
use tower::ServiceExt;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// `MemoryStore` that counts every call it serves
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn execute(&self, operation: Operation, params: Params) -> Result<StoreStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(operation, params).await
    }

    async fn execute_with_results(
        &self,
        operation: Operation,
        params: Params,
    ) -> Result<StoreResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute_with_results(operation, params).await
    }
}

/// Response captured in full
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn header(&self, name: impl axum::http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn result_code(&self) -> Option<&str> {
        self.header(headers::RESULT_CODE)
    }

    pub fn message(&self) -> Option<&str> {
        self.header(headers::MESSAGE)
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Trailing id of the location header
    pub fn location_id(&self) -> i64 {
        self.header(headers::LOCATION)
            .and_then(|location| location.rsplit('/').next())
            .and_then(|id| id.parse().ok())
            .unwrap()
    }
}

/// Test application: the real router over a counting in-memory store
pub struct TestApp {
    pub config: Config,
    pub store: Arc<CountingStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let store = Arc::new(CountingStore::default());
        let router = convos_app::create_app(&config, store.clone());
        Self {
            config,
            store,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, caller: i64) -> TestResponse {
        self.send(request(Method::GET, uri, Some(caller), None)).await
    }

    /// Create a conversation and return its id
    pub async fn create_convo(&self, caller: i64, participant: i64, subject: &str) -> i64 {
        let response = self
            .send(request(
                Method::POST,
                "/api/Convo",
                Some(caller),
                Some(serde_json::json!({"Participant": participant, "Subject": subject})),
            ))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.message());
        response.location_id()
    }

    /// Post a message (or a reply when `parent` is set) and return its id
    pub async fn create_message(
        &self,
        caller: i64,
        convo_id: i64,
        recipient: i64,
        body: &str,
        parent: Option<i64>,
    ) -> i64 {
        let uri = match parent {
            Some(parent) => format!("/api/Convo/{}/Message/{}", convo_id, parent),
            None => format!("/api/Convo/{}/Message", convo_id),
        };
        let response = self
            .send(request(
                Method::POST,
                &uri,
                Some(caller),
                Some(serde_json::json!({"Body": body, "Recipient": recipient})),
            ))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.message());
        response.location_id()
    }
}

/// Build a request, optionally with a caller identity and JSON body
pub fn request(method: Method, uri: &str, caller: Option<i64>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(headers::CALLER_ID, caller.to_string());
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
