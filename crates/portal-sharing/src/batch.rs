//! Fan-out/fan-in over a batch of independent API calls.
//!
//! Requests are accumulated with [`RequestBatch::push`], then all launched at once, each on
//! its own tokio task. [`RequestBatch::run`] waits for all of them and fails with the first
//! error to arrive; tasks still in flight at that point keep running to completion and
//! their results are dropped. Results always come back in push order.

use crate::client::{ApiClient, ApiRequest};
use crate::error::ApiError;
use futures_util::future::{join_all, try_join_all};
use portal_core::ResourceKind;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What a batched request does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Share(ResourceKind),
    Unshare(ResourceKind),
    ListPermissions(ResourceKind),
}

impl Operation {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Share(kind) | Self::Unshare(kind) | Self::ListPermissions(kind) => *kind,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Share(kind) => write!(f, "share {}", kind),
            Self::Unshare(kind) => write!(f, "unshare {}", kind),
            Self::ListPermissions(kind) => write!(f, "list {} permissions", kind),
        }
    }
}

/// Pending requests, in the order their results will be reported.
#[derive(Debug, Clone)]
pub struct RequestBatch {
    name: &'static str,
    requests: Vec<(Operation, ApiRequest)>,
}

impl RequestBatch {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            requests: Vec::new(),
        }
    }

    pub fn push(&mut self, operation: Operation, request: ApiRequest) {
        self.requests.push((operation, request));
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.requests.iter().map(|(op, _)| *op).collect()
    }

    pub fn requests(&self) -> impl Iterator<Item = &ApiRequest> {
        self.requests.iter().map(|(_, req)| req)
    }

    fn spawn(
        self,
        client: &Arc<dyn ApiClient>,
    ) -> Vec<(Operation, JoinHandle<Result<serde_json::Value, ApiError>>)> {
        let name = self.name;
        tracing::info!(batch = name, requests = self.requests.len(), "dispatching request batch");
        self.requests
            .into_iter()
            .map(|(operation, request)| {
                let client = Arc::clone(client);
                tracing::debug!(batch = name, %operation, endpoint = %request.endpoint, "request queued");
                (operation, tokio::spawn(async move { client.call_api(request).await }))
            })
            .collect()
    }

    /// Runs every request concurrently. Resolves to the responses in push order, or to the
    /// first error. An empty batch resolves to an empty list without touching the client.
    pub async fn run(self, client: &Arc<dyn ApiClient>) -> Result<Vec<serde_json::Value>, ApiError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let name = self.name;
        let handles = self.spawn(client);
        try_join_all(handles.into_iter().map(|(operation, handle)| async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(ApiError::from(join_err)),
            };
            result.map_err(|err| {
                tracing::warn!(batch = name, %operation, error = %err, "batched request failed");
                err
            })
        }))
        .await
    }

    /// Runs every request concurrently and waits for all of them, keeping each outcome.
    pub async fn run_settled(self, client: &Arc<dyn ApiClient>) -> BatchReport {
        if self.is_empty() {
            return BatchReport::default();
        }
        let handles = self.spawn(client);
        let outcomes = join_all(handles.into_iter().map(|(operation, handle)| async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(ApiError::from(join_err)),
            };
            (operation, result)
        }))
        .await;
        BatchReport { outcomes }
    }
}

/// Per-request outcomes of a settled batch, in push order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(Operation, Result<serde_json::Value, ApiError>)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, result)| result.is_ok())
    }

    pub fn succeeded(&self) -> Vec<Operation> {
        self.outcomes
            .iter()
            .filter(|(_, result)| result.is_ok())
            .map(|(op, _)| *op)
            .collect()
    }

    pub fn failed(&self) -> Vec<(Operation, &ApiError)> {
        self.outcomes
            .iter()
            .filter_map(|(op, result)| result.as_ref().err().map(|err| (*op, err)))
            .collect()
    }

    /// All responses, or the error of the first failed request in push order.
    pub fn into_result(self) -> Result<Vec<serde_json::Value>, ApiError> {
        self.outcomes.into_iter().map(|(_, result)| result).collect()
    }
}
