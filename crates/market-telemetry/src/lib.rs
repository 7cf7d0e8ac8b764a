//! # Market Telemetry
//!
//! Structured logging initialization for the marketplace engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Application code here; tracing events are now collected.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MARKET_SERVICE_NAME` | `taskmarket` | Service name attached to logs |
//! | `MARKET_LOG_LEVEL` or `RUST_LOG` | `info` | Log level filter |
//! | `MARKET_LOG_JSON` | `false` (true in containers) | JSON log formatting |

pub mod config;

pub use config::TelemetryConfig;

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// The configured filter directive does not parse.
    #[error("Invalid log filter: {0}")]
    Filter(String),
}

/// Guard that keeps telemetry active. Hold it for the process lifetime.
#[derive(Debug)]
pub struct TelemetryGuard {
    _private: (),
}

/// Initialize structured logging from configuration.
///
/// Installs a `tracing-subscriber` formatter with an environment filter.
/// Returns a guard to hold for the lifetime of the application.
///
/// # Errors
/// Fails if the filter directive is invalid or a global subscriber is
/// already installed (e.g. a second initialization in the same process).
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let result = if config.json_logs {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };
    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard { _private: () })
}
