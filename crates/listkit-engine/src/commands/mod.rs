//! Command orchestration layer.
//!
//! Provides high-level operations that drive the external batch
//! collaborator using the classification and backoff rules from core.

pub mod batch_retry;
