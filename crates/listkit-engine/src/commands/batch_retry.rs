//! Batch submission with selective retries.
//!
//! ## Retry loop (per attempt):
//! 1. Submit the pending batch through the [`BatchSubmitter`]
//! 2. Check the per-item results cover exactly the submitted ids
//! 3. Merge every item's status and response into the running outcome
//! 4. Stop when nothing is retryable or the attempt budget is spent
//! 5. Wait for the next backoff delay
//! 6. Rebuild the batch from the retryable steps only, ids and
//!    dependency lists untouched
//!
//! A transport or protocol failure of a whole round trip resubmits the same
//! batch unchanged; it is only returned once no attempts remain.

use crate::transport::{AttemptResponse, BatchSubmitter, Sleeper, TokioSleeper};
use listkit_core::batch::{classify_status, BatchStepRegistry, StatusClass};
use listkit_core::errors::{ExError, ExResult, ListKitError};
use listkit_core::retry::{default_retry_options, BackoffSchedule, RetryOptions};
use listkit_core_types::schema::{EVENT_ATTEMPT, EVENT_BACKOFF};
use listkit_core_types::CorrelationId;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

const OP_SUBMIT: &str = "submit_with_retry";

/// Final per-item results of one retry sequence.
///
/// Every id of the submitted batch appears exactly once. For ids that were
/// resubmitted, the values come from the last attempt that included them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    statuses: BTreeMap<String, u16>,
    responses: BTreeMap<String, Value>,
    attempts: u32,
    correlation_id: CorrelationId,
}

impl BatchOutcome {
    /// Final status of one step
    pub fn status(&self, id: &str) -> Option<u16> {
        self.statuses.get(id).copied()
    }

    /// Final raw response of one step
    pub fn response(&self, id: &str) -> Option<&Value> {
        self.responses.get(id)
    }

    pub fn statuses(&self) -> &BTreeMap<String, u16> {
        &self.statuses
    }

    pub fn responses(&self) -> &BTreeMap<String, Value> {
        &self.responses
    }

    /// Number of round trips made, including failed ones
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Ids whose final status is 2xx
    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.ids_where(|class| class == StatusClass::Succeeded)
    }

    /// Ids whose final status is not 2xx
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.ids_where(|class| class != StatusClass::Succeeded)
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Split into the status map and the response map
    pub fn into_parts(self) -> (BTreeMap<String, u16>, BTreeMap<String, Value>) {
        (self.statuses, self.responses)
    }

    fn ids_where(&self, keep: impl Fn(StatusClass) -> bool) -> impl Iterator<Item = &str> {
        self.statuses
            .iter()
            .filter(move |(_, status)| keep(classify_status(**status)))
            .map(|(id, _)| id.as_str())
    }
}

/// Submits batches and resubmits retryable items with backoff.
///
/// Retry options are taken from the process-wide defaults when the
/// orchestrator is built; [`Self::with_options`] overrides them.
pub struct BatchRetryOrchestrator<S, Z = TokioSleeper> {
    submitter: S,
    sleeper: Z,
    options: RetryOptions,
}

impl<S: BatchSubmitter> BatchRetryOrchestrator<S> {
    pub fn new(submitter: S) -> Self {
        Self {
            submitter,
            sleeper: TokioSleeper,
            options: default_retry_options(),
        }
    }
}

impl<S: BatchSubmitter, Z: Sleeper> BatchRetryOrchestrator<S, Z> {
    /// Replace the sleeper used between attempts
    pub fn with_sleeper<Z2: Sleeper>(self, sleeper: Z2) -> BatchRetryOrchestrator<S, Z2> {
        BatchRetryOrchestrator {
            submitter: self.submitter,
            sleeper,
            options: self.options,
        }
    }

    /// Replace the retry options used by [`Self::submit`]
    pub fn with_options(mut self, options: RetryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Submit `registry` with the orchestrator's own retry options.
    ///
    /// # Errors
    ///
    /// See [`Self::submit_with_retry`].
    pub async fn submit(&self, registry: &BatchStepRegistry) -> ExResult<BatchOutcome> {
        self.submit_with_retry(registry, &self.options).await
    }

    /// Submit `registry`, resubmitting retryable items until they settle or
    /// `options.max_retries` attempts have been made.
    ///
    /// Per-item failures never surface as errors; they are reported in the
    /// returned [`BatchOutcome`]. Dropping the returned future abandons the
    /// sequence between attempts.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration`: `options` fail validation
    /// - `EmptyBatch`, `DuplicateStep`, `UnknownDependency`: `registry` is not submittable
    /// - `Transport`, `Protocol`: the last allowed attempt failed as a whole
    /// - any non-transient error reported by the submitter, immediately
    pub async fn submit_with_retry(
        &self,
        registry: &BatchStepRegistry,
        options: &RetryOptions,
    ) -> ExResult<BatchOutcome> {
        let start = Instant::now();
        let correlation_id = CorrelationId::new();
        listkit_core::log_op_start!(
            OP_SUBMIT,
            correlation_id = %correlation_id,
            batch_size = registry.len(),
            max_retries = options.max_retries,
        );

        let result = self.run(registry, options, &correlation_id).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => {
                listkit_core::log_op_end!(
                    OP_SUBMIT,
                    duration_ms = duration_ms,
                    correlation_id = %correlation_id,
                    attempts = outcome.attempts,
                );
            }
            Err(err) => {
                listkit_core::log_op_error!(
                    OP_SUBMIT,
                    err.clone(),
                    duration_ms = duration_ms,
                    correlation_id = %correlation_id,
                );
            }
        }
        result
    }

    async fn run(
        &self,
        registry: &BatchStepRegistry,
        options: &RetryOptions,
        correlation_id: &CorrelationId,
    ) -> ExResult<BatchOutcome> {
        let tag = |err: ExError| err.with_op(OP_SUBMIT).with_correlation_id(correlation_id.clone());
        options.validate().map_err(|e| tag(e.into()))?;
        registry.validate().map_err(|e| tag(e.into()))?;

        let mut schedule = options.backoff_schedule();
        let mut pending = registry.clone();
        let mut statuses = BTreeMap::new();
        let mut responses = BTreeMap::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let last_attempt = attempt >= options.max_retries;

            let response = match self.attempt_once(&pending).await {
                Ok(response) => response,
                Err(err) => {
                    let err = tag(err).with_attempt(attempt);
                    if last_attempt || !err.kind().is_transient() {
                        return Err(err);
                    }
                    tracing::warn!(
                        component = module_path!(),
                        op = OP_SUBMIT,
                        event = EVENT_ATTEMPT,
                        correlation_id = %correlation_id,
                        attempt,
                        err.code = err.code(),
                        "batch round trip failed, resubmitting unchanged"
                    );
                    self.back_off(&mut schedule, attempt, correlation_id).await;
                    continue;
                }
            };

            let tally = merge_attempt(response, &mut statuses, &mut responses);
            tracing::info!(
                component = module_path!(),
                op = OP_SUBMIT,
                event = EVENT_ATTEMPT,
                correlation_id = %correlation_id,
                attempt,
                batch_size = pending.len(),
                succeeded = tally.succeeded,
                retryable = tally.retryable.len(),
                terminal = tally.terminal,
            );

            if tally.retryable.is_empty() {
                break;
            }
            if last_attempt {
                tracing::warn!(
                    component = module_path!(),
                    op = OP_SUBMIT,
                    correlation_id = %correlation_id,
                    attempt,
                    retryable = tally.retryable.len(),
                    "retry budget exhausted with retryable items outstanding"
                );
                break;
            }

            self.back_off(&mut schedule, attempt, correlation_id).await;
            pending = pending.retain_ids(&tally.retryable);
            for (step_id, dependency_id) in pending.dangling_dependencies() {
                tracing::debug!(
                    component = module_path!(),
                    op = OP_SUBMIT,
                    correlation_id = %correlation_id,
                    step_id = %step_id,
                    dependency_id = %dependency_id,
                    "retried step depends on a step outside the retry batch"
                );
            }
        }

        Ok(BatchOutcome {
            statuses,
            responses,
            attempts: attempt,
            correlation_id: correlation_id.clone(),
        })
    }

    async fn attempt_once(&self, pending: &BatchStepRegistry) -> ExResult<AttemptResponse> {
        let response = self.submitter.submit_batch(pending).await?;
        check_coverage(pending, &response)?;
        Ok(response)
    }

    async fn back_off(
        &self,
        schedule: &mut BackoffSchedule,
        attempt: u32,
        correlation_id: &CorrelationId,
    ) {
        let delay = schedule.next_delay();
        tracing::info!(
            component = module_path!(),
            op = OP_SUBMIT,
            event = EVENT_BACKOFF,
            correlation_id = %correlation_id,
            attempt,
            delay_secs = delay.as_secs(),
        );
        self.sleeper.sleep(delay).await;
    }
}

/// The response must report on every submitted id and nothing else.
fn check_coverage(pending: &BatchStepRegistry, response: &AttemptResponse) -> ExResult<()> {
    if let Some(id) = pending.ids().find(|id| !response.statuses.contains_key(*id)) {
        return Err(ListKitError::MissingItemResponse {
            step_id: id.to_string(),
        }
        .into());
    }
    if let Some(id) = response.statuses.keys().find(|id| !pending.contains(id)) {
        return Err(ListKitError::UnexpectedItemResponse {
            step_id: id.clone(),
        }
        .into());
    }
    Ok(())
}

/// Classification of one attempt's items
#[derive(Debug, Default)]
struct AttemptTally {
    succeeded: usize,
    retryable: BTreeSet<String>,
    terminal: usize,
}

/// Fold one attempt into the running maps, later attempts overwriting
/// earlier ones.
fn merge_attempt(
    response: AttemptResponse,
    statuses: &mut BTreeMap<String, u16>,
    responses: &mut BTreeMap<String, Value>,
) -> AttemptTally {
    let AttemptResponse {
        statuses: attempt_statuses,
        responses: mut attempt_responses,
    } = response;

    let mut tally = AttemptTally::default();
    for (id, status) in attempt_statuses {
        match classify_status(status) {
            StatusClass::Succeeded => tally.succeeded += 1,
            StatusClass::Retryable => {
                tally.retryable.insert(id.clone());
            }
            StatusClass::Terminal => tally.terminal += 1,
        }
        let body = attempt_responses.remove(&id).unwrap_or(Value::Null);
        responses.insert(id.clone(), body);
        statuses.insert(id, status);
    }
    tally
}
