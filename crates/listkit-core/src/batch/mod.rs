//! Batch request building blocks.
//!
//! A batch is a set of [`BatchStep`]s held by a [`BatchStepRegistry`]. Each
//! step carries a caller-visible id, an opaque [`BatchRequest`], and the ids
//! of the steps it depends on. The registry is what the retry engine submits
//! and what it rebuilds, reduced, between attempts.

pub mod registry;
pub mod request;
pub mod status;

pub use registry::{BatchStep, BatchStepRegistry};
pub use request::{BatchRequest, HttpMethod};
pub use status::{classify_status, StatusClass, RETRYABLE_STATUSES};
