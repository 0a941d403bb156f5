//! Per-item status classification.

use serde::{Deserialize, Serialize};

/// Statuses worth resubmitting: transient server errors plus throttling
/// (429) and resource locking (423).
pub const RETRYABLE_STATUSES: [u16; 6] = [423, 429, 500, 502, 503, 504];

/// How the retry engine treats one item's status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    /// 2xx
    Succeeded,
    /// Resubmitted while retry budget remains
    Retryable,
    /// Recorded and never resubmitted
    Terminal,
}

/// Classify a per-item status code.
///
/// Anything that is neither 2xx nor in [`RETRYABLE_STATUSES`] is terminal,
/// including redirects and unlisted 5xx codes such as 501.
pub fn classify_status(status: u16) -> StatusClass {
    if (200..300).contains(&status) {
        StatusClass::Succeeded
    } else if RETRYABLE_STATUSES.contains(&status) {
        StatusClass::Retryable
    } else {
        StatusClass::Terminal
    }
}
