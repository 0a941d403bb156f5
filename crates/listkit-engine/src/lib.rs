//! listkit engine - batch submission orchestration
//!
//! Coordinates the pure building blocks of `listkit-core` with an external
//! batch-submission collaborator: submits a batch, resubmits only the
//! retryable failures with backoff, and merges per-item outcomes.

pub mod commands;
pub mod transport;

pub use commands::batch_retry::{BatchOutcome, BatchRetryOrchestrator};
pub use transport::{AttemptResponse, BatchSubmitter, Sleeper, TokioSleeper};
