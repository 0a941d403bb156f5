//! Retry options.

use crate::errors::{ListKitError, Result};
use crate::retry::backoff::{BackoffPolicy, BackoffSchedule};
use std::str::FromStr;
use std::sync::Once;
use std::time::Duration;

pub const ENV_MAX_RETRIES: &str = "LISTKIT_MAX_RETRIES";
pub const ENV_INITIAL_DELAY_SECONDS: &str = "LISTKIT_INITIAL_DELAY_SECONDS";
pub const ENV_EXPONENTIAL_BACKOFF: &str = "LISTKIT_EXPONENTIAL_BACKOFF";
pub const ENV_MAX_DELAY_SECONDS: &str = "LISTKIT_MAX_DELAY_SECONDS";

static DOTENV_LOADED: Once = Once::new();

/// Settings for one batch retry sequence.
///
/// `max_retries` counts submissions, so `max_retries = 1` means a single
/// attempt with no retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOptions {
    /// Maximum number of submissions (>= 1)
    pub max_retries: u32,
    /// First backoff delay in seconds (>= 1)
    pub initial_delay_seconds: u64,
    /// Double the delay after each attempt instead of keeping it constant
    pub exponential_backoff: bool,
    /// Upper bound for exponential delays in seconds (>= 1)
    pub max_delay_seconds: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_seconds: 1,
            exponential_backoff: true,
            max_delay_seconds: 60,
        }
    }
}

impl RetryOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay_seconds(mut self, seconds: u64) -> Self {
        self.initial_delay_seconds = seconds;
        self
    }

    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    pub fn with_max_delay_seconds(mut self, seconds: u64) -> Self {
        self.max_delay_seconds = seconds;
        self
    }

    /// Reject settings the retry loop cannot honour.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRetryOptions` if `max_retries`, `initial_delay_seconds`
    /// or `max_delay_seconds` is below 1.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries < 1 {
            return Err(ListKitError::InvalidRetryOptions {
                reason: format!("max_retries must be at least 1, got {}", self.max_retries),
            });
        }
        if self.initial_delay_seconds < 1 {
            return Err(ListKitError::InvalidRetryOptions {
                reason: format!(
                    "initial_delay_seconds must be at least 1, got {}",
                    self.initial_delay_seconds
                ),
            });
        }
        if self.max_delay_seconds < 1 {
            return Err(ListKitError::InvalidRetryOptions {
                reason: format!(
                    "max_delay_seconds must be at least 1, got {}",
                    self.max_delay_seconds
                ),
            });
        }
        Ok(())
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_seconds)
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        if self.exponential_backoff {
            BackoffPolicy::Exponential {
                max_delay: Duration::from_secs(self.max_delay_seconds),
            }
        } else {
            BackoffPolicy::Constant
        }
    }

    /// Fresh delay schedule for one retry sequence
    pub fn backoff_schedule(&self) -> BackoffSchedule {
        BackoffSchedule::new(self.initial_delay(), self.backoff_policy())
    }

    /// Load options from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first (once per
    /// process). Unset variables keep their default.
    ///
    /// # Errors
    ///
    /// - `InvalidConfigValue`: a variable is set but cannot be parsed
    /// - `InvalidRetryOptions`: the resulting options fail [`Self::validate`]
    pub fn from_env() -> Result<Self> {
        DOTENV_LOADED.call_once(|| {
            // a missing .env file is fine
            let _ = dotenvy::dotenv();
        });
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load options through an arbitrary key lookup, with the same rules as
    /// [`Self::from_env`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let options = Self {
            max_retries: parse_or(&lookup, ENV_MAX_RETRIES, defaults.max_retries)?,
            initial_delay_seconds: parse_or(
                &lookup,
                ENV_INITIAL_DELAY_SECONDS,
                defaults.initial_delay_seconds,
            )?,
            exponential_backoff: match lookup(ENV_EXPONENTIAL_BACKOFF) {
                None => defaults.exponential_backoff,
                Some(raw) => parse_flag(ENV_EXPONENTIAL_BACKOFF, &raw)?,
            },
            max_delay_seconds: parse_or(&lookup, ENV_MAX_DELAY_SECONDS, defaults.max_delay_seconds)?,
        };
        options.validate()?;
        Ok(options)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let parsed: std::result::Result<T, _> = raw.trim().parse();
            parsed.map_err(|_| ListKitError::InvalidConfigValue {
                key: key.to_string(),
                value: raw.clone(),
            })
        }
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ListKitError::InvalidConfigValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let opts = RetryOptions::default();
        assert_eq!(opts.max_retries, 5);
        assert_eq!(opts.initial_delay_seconds, 1);
        assert!(opts.exponential_backoff);
        assert_eq!(opts.max_delay_seconds, 60);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = RetryOptions::default().with_max_retries(0).validate().unwrap_err();
        assert!(matches!(err, ListKitError::InvalidRetryOptions { .. }));
    }

    #[test]
    fn test_zero_delay_rejected() {
        let err = RetryOptions::default()
            .with_initial_delay_seconds(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ListKitError::InvalidRetryOptions { .. }));
    }

    #[test]
    fn test_backoff_policy_follows_flag() {
        let opts = RetryOptions::default().with_max_delay_seconds(30);
        assert_eq!(
            opts.backoff_policy(),
            BackoffPolicy::Exponential {
                max_delay: Duration::from_secs(30)
            }
        );
        assert_eq!(
            opts.with_exponential_backoff(false).backoff_policy(),
            BackoffPolicy::Constant
        );
    }

    #[test]
    fn test_lookup_with_no_keys_gives_defaults() {
        let opts = RetryOptions::from_lookup(|_| None).unwrap();
        assert_eq!(opts, RetryOptions::default());
    }

    #[test]
    fn test_lookup_overrides() {
        let opts = RetryOptions::from_lookup(lookup_from(&[
            (ENV_MAX_RETRIES, "3"),
            (ENV_INITIAL_DELAY_SECONDS, " 2 "),
            (ENV_EXPONENTIAL_BACKOFF, "off"),
        ]))
        .unwrap();
        assert_eq!(opts.max_retries, 3);
        assert_eq!(opts.initial_delay_seconds, 2);
        assert!(!opts.exponential_backoff);
        assert_eq!(opts.max_delay_seconds, 60);
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let err = RetryOptions::from_lookup(lookup_from(&[(ENV_MAX_RETRIES, "many")])).unwrap_err();
        assert_eq!(
            err,
            ListKitError::InvalidConfigValue {
                key: ENV_MAX_RETRIES.to_string(),
                value: "many".to_string()
            }
        );
    }

    #[test]
    fn test_lookup_validates_result() {
        let err = RetryOptions::from_lookup(lookup_from(&[(ENV_MAX_RETRIES, "0")])).unwrap_err();
        assert!(matches!(err, ListKitError::InvalidRetryOptions { .. }));
    }
}
