//! Retry configuration and backoff scheduling.
//!
//! The async retry loop lives in `listkit-engine`; this module holds the
//! pure parts it is driven by: [`RetryOptions`], the [`BackoffSchedule`]
//! and the process-wide defaults holder.

pub mod backoff;
pub mod defaults;
pub mod options;

pub use backoff::{BackoffPolicy, BackoffSchedule};
pub use defaults::{default_retry_options, defaults_installed, install_default_retry_options};
pub use options::RetryOptions;
