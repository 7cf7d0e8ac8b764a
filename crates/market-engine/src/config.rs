//! Engine configuration.

use std::time::Duration;

/// Environment variable for the bounded lock wait, in milliseconds.
const ENV_LOCK_TIMEOUT_MS: &str = "MARKET_LOCK_TIMEOUT_MS";

/// Environment variable for the xp awarded per settled task.
const ENV_XP_PER_COMPLETION: &str = "MARKET_XP_PER_COMPLETION";

/// Tunables for the lifecycle engine.
///
/// The lock timeout bounds how long a store operation may wait to begin;
/// an expired wait surfaces as a retryable `Timeout` with nothing written.
/// It stands in for the database statement timeout of a SQL deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum wait for the store's write lock before giving up.
    pub lock_timeout: Duration,
    /// Experience points a tasker earns per settled task.
    pub xp_per_completion: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(2_000),
            xp_per_completion: 10,
        }
    }
}

impl EngineConfig {
    /// Builds a configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let lock_timeout = std::env::var(ENV_LOCK_TIMEOUT_MS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(defaults.lock_timeout, Duration::from_millis);

        let xp_per_completion = std::env::var(ENV_XP_PER_COMPLETION)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.xp_per_completion);

        Self {
            lock_timeout,
            xp_per_completion,
        }
    }
}
