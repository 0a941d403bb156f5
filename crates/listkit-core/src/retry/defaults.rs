//! Process-wide default retry options.
//!
//! Installed at most once, typically at startup. Orchestrators read the
//! defaults when they are constructed, so installing after construction
//! does not affect existing orchestrators.

use crate::errors::{ListKitError, Result};
use crate::retry::options::RetryOptions;
use std::sync::OnceLock;

static DEFAULT_RETRY_OPTIONS: OnceLock<RetryOptions> = OnceLock::new();

/// Install the process-wide default retry options.
///
/// # Errors
///
/// - `InvalidRetryOptions`: `options` fail validation
/// - `DefaultsAlreadyConfigured`: defaults were installed before
pub fn install_default_retry_options(options: RetryOptions) -> Result<()> {
    options.validate()?;
    DEFAULT_RETRY_OPTIONS
        .set(options)
        .map_err(|_| ListKitError::DefaultsAlreadyConfigured)?;
    tracing::debug!(
        component = module_path!(),
        op = "install_default_retry_options",
        "default retry options installed"
    );
    Ok(())
}

/// The installed defaults, or [`RetryOptions::default`] if none were installed
pub fn default_retry_options() -> RetryOptions {
    DEFAULT_RETRY_OPTIONS.get().cloned().unwrap_or_default()
}

/// True once [`install_default_retry_options`] has succeeded
pub fn defaults_installed() -> bool {
    DEFAULT_RETRY_OPTIONS.get().is_some()
}
