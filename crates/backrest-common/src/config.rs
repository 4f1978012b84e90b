//! Environment configuration
//!
//! Provides trait-based access to environment configuration so that tests
//! can inject values without touching process-global state.

use std::time::Duration;

use crate::context::{WaitPolicy, DEFAULT_WAIT_ATTEMPTS};
use crate::DEFAULT_NAMESPACE;

/// Environment variable naming the namespace clusters and tasks live in
pub const NAMESPACE_ENV: &str = "NAMESPACE";
/// Environment variable overriding the number of propagation observations
pub const WAIT_ATTEMPTS_ENV: &str = "BACKREST_WAIT_ATTEMPTS";
/// Environment variable overriding the seconds between observations
pub const WAIT_INTERVAL_ENV: &str = "BACKREST_WAIT_INTERVAL_SECS";

/// Trait for reading process environment configuration
#[cfg_attr(test, mockall::automock)]
pub trait EnvConfig: Send + Sync {
    /// Value of an environment variable, `None` when unset
    fn var(&self, key: &str) -> Option<String>;
}

/// Default implementation that reads from environment variables
#[derive(Clone, Default)]
pub struct OsEnvConfig;

impl EnvConfig for OsEnvConfig {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Namespace from the environment, or [`DEFAULT_NAMESPACE`]
pub fn namespace(env: &dyn EnvConfig) -> String {
    env.var(NAMESPACE_ENV)
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

/// Propagation wait policy from the environment
///
/// Unset or unparseable values fall back to the defaults.
pub fn wait_policy(env: &dyn EnvConfig) -> WaitPolicy {
    let defaults = WaitPolicy::default();
    let max_attempts = env
        .var(WAIT_ATTEMPTS_ENV)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_WAIT_ATTEMPTS);
    let interval = env
        .var(WAIT_INTERVAL_ENV)
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(defaults.interval);
    WaitPolicy::new(max_attempts, interval)
}
