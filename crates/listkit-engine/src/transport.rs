//! Seams to the outside world: batch submission and waiting.

use async_trait::async_trait;
use listkit_core::batch::BatchStepRegistry;
use listkit_core::errors::ExResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-item results of one batch round trip.
///
/// `statuses` must hold exactly the submitted ids. A missing raw response is
/// recorded as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptResponse {
    pub statuses: BTreeMap<String, u16>,
    pub responses: BTreeMap<String, Value>,
}

impl AttemptResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one item's status and raw response
    pub fn with_item(mut self, id: impl Into<String>, status: u16, response: Value) -> Self {
        self.insert(id, status, response);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, status: u16, response: Value) {
        let id = id.into();
        self.statuses.insert(id.clone(), status);
        self.responses.insert(id, response);
    }
}

/// The external collaborator that performs one batch round trip.
///
/// Implementations report transport failures as `ExErrorKind::Transport`
/// errors; per-item failures belong in the returned statuses.
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    /// Submit every step of `batch` in one request.
    async fn submit_batch(&self, batch: &BatchStepRegistry) -> ExResult<AttemptResponse>;
}

#[async_trait]
impl<T: BatchSubmitter + ?Sized> BatchSubmitter for std::sync::Arc<T> {
    async fn submit_batch(&self, batch: &BatchStepRegistry) -> ExResult<AttemptResponse> {
        (**self).submit_batch(batch).await
    }
}

/// Suspends the retry loop between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
