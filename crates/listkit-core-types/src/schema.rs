//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_CORRELATION_ID: &str = "correlation_id";

// Batch identifiers
pub const FIELD_STEP_ID: &str = "step_id";
pub const FIELD_ATTEMPT: &str = "attempt";
pub const FIELD_BATCH_SIZE: &str = "batch_size";
pub const FIELD_DELAY_SECS: &str = "delay_secs";

// Classification counts
pub const FIELD_SUCCEEDED: &str = "succeeded";
pub const FIELD_RETRYABLE: &str = "retryable";
pub const FIELD_TERMINAL: &str = "terminal";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_ATTEMPT: &str = "attempt";
pub const EVENT_BACKOFF: &str = "backoff";
