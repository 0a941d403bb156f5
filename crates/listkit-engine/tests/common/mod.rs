//! Shared test doubles for orchestrator tests

#![allow(dead_code)]

use async_trait::async_trait;
use listkit_core::batch::{BatchRequest, BatchStepRegistry};
use listkit_core::errors::{ExError, ExErrorKind, ExResult};
use listkit_engine::{AttemptResponse, BatchSubmitter, Sleeper};
use serde_json::json;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted submitter does on one round trip.
pub enum Scripted {
    /// Answer with these statuses; ids not listed get 200
    Statuses(Vec<(&'static str, u16)>),
    /// Fail the whole round trip
    Fail(ExError),
    /// Answer exactly with this response, unchecked
    Raw(AttemptResponse),
}

/// Submitter that replays a script and records every batch it receives.
///
/// Once the script runs out every item answers 200. Each response body is
/// `{"id": <id>, "attempt": <n>}`.
#[derive(Clone, Default)]
pub struct ScriptedSubmitter {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    seen: Arc<Mutex<Vec<BatchStepRegistry>>>,
}

impl ScriptedSubmitter {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every batch submitted so far, in order
    pub fn batches(&self) -> Vec<BatchStepRegistry> {
        self.seen.lock().unwrap().clone()
    }

    /// Ids of the n-th submitted batch (0-based)
    pub fn batch_ids(&self, n: usize) -> Vec<String> {
        self.batches()[n].ids().map(str::to_string).collect()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl BatchSubmitter for ScriptedSubmitter {
    async fn submit_batch(&self, batch: &BatchStepRegistry) -> ExResult<AttemptResponse> {
        let attempt = {
            let mut seen = self.seen.lock().unwrap();
            seen.push(batch.clone());
            seen.len()
        };
        let next = self.script.lock().unwrap().pop_front();

        let overrides: BTreeMap<&str, u16> = match next {
            Some(Scripted::Fail(err)) => return Err(err),
            Some(Scripted::Raw(response)) => return Ok(response),
            Some(Scripted::Statuses(statuses)) => statuses.into_iter().collect(),
            None => BTreeMap::new(),
        };

        let mut response = AttemptResponse::new();
        for id in batch.ids() {
            let status = overrides.get(id).copied().unwrap_or(200);
            response.insert(id, status, json!({"id": id, "attempt": attempt}));
        }
        Ok(response)
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn delay_secs(&self) -> Vec<u64> {
        self.delays().iter().map(Duration::as_secs).collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

pub fn transport_error(message: &str) -> ExError {
    ExError::new(ExErrorKind::Transport).with_message(message)
}

/// Three independent item updates: ids "1", "2", "3"
pub fn three_updates() -> BatchStepRegistry {
    let mut reg = BatchStepRegistry::new();
    for id in ["1", "2", "3"] {
        reg.add_step(
            id,
            BatchRequest::patch(format!("lists/tasks/items/{id}"), json!({"Status": "Done"})),
            Vec::<String>::new(),
        )
        .unwrap();
    }
    reg
}

/// Create, then update and link depending on it: ids "a", "b", "c"
pub fn dependent_chain() -> BatchStepRegistry {
    let mut reg = BatchStepRegistry::new();
    reg.add_step(
        "a",
        BatchRequest::post("lists/tasks/items", json!({"Title": "New"})),
        Vec::<String>::new(),
    )
    .unwrap();
    reg.add_step("b", BatchRequest::patch("lists/tasks/items/$a", json!({"Owner": 7})), ["a"])
        .unwrap();
    reg.add_step("c", BatchRequest::post("lists/links/items", json!({})), ["a", "b"])
        .unwrap();
    reg
}
