//! Scripted store and log capture for unit tests

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use convos_common::{Error, Result};

use crate::repository::{Operation, Params, Store, StoreResults, StoreStatus};

/// Replays queued replies in order and records every call
#[derive(Default)]
pub struct ScriptedStore {
    replies: Mutex<VecDeque<Result<StoreResults>>>,
    calls: Mutex<Vec<(Operation, Params)>>,
}

impl ScriptedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, results: StoreResults) {
        self.replies.lock().unwrap().push_back(Ok(results));
    }

    pub fn fail(&self, error: Error) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<(Operation, Params)> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, operation: Operation, params: Params) -> Result<StoreResults> {
        self.calls.lock().unwrap().push((operation, params));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Internal(format!("no reply scripted for {}", operation))))
    }
}

#[async_trait]
impl Store for ScriptedStore {
    async fn execute(&self, operation: Operation, params: Params) -> Result<StoreStatus> {
        self.next(operation, params).map(|results| results.status)
    }

    async fn execute_with_results(
        &self,
        operation: Operation,
        params: Params,
    ) -> Result<StoreResults> {
        self.next(operation, params)
    }
}

/// In-memory log sink for a `tracing_subscriber::fmt()` subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Install a subscriber writing here for the current thread
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
