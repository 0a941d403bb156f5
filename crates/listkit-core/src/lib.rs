//! listkit core - client-side state tracking and batch building blocks
//!
//! This crate provides the synchronous, I/O-free half of listkit:
//! - Field snapshots and change tracking for a single record
//! - Field-level version diffing with one-line and Markdown summaries
//! - Batch step registries and per-item status classification
//! - Retry options, backoff scheduling and process-wide defaults
//! - The error and logging facilities shared with `listkit-engine`

pub mod batch;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod retry;
pub mod snapshot;
pub mod tracking;

// Re-export commonly used types
pub use batch::{BatchRequest, BatchStep, BatchStepRegistry, HttpMethod, StatusClass};
pub use diff::{compare_versions, ChangeKind, FieldDifference, VersionComparison};
pub use errors::{ExError, ExErrorKind, ExResult, ListKitError, Result};
pub use retry::{BackoffPolicy, BackoffSchedule, RetryOptions};
pub use snapshot::FieldSnapshot;
pub use tracking::{ChangeTracker, SnapshotProvider};
