//! # Graph Telemetry
//!
//! Structured logging for the address-graph binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graph_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GRAPH_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `GRAPH_JSON_LOGS` | `false` | JSON formatted output |
//! | `GRAPH_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `GRAPH_SERVICE_NAME` | `address-graph` | Service name in startup log |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::env_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    AlreadyInitialized(String),

    /// The log level directive could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
///
/// Call once, before any other work.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}

/// Convenience macro for creating a span tagged with an address.
///
/// # Example
///
/// ```rust,ignore
/// use graph_telemetry::address_span;
///
/// let _span = address_span!("history", "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").entered();
/// ```
#[macro_export]
macro_rules! address_span {
    ($name:expr, $address:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name, address = %$address $(, $($field)*)?)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        // Either this test or another installed the subscriber first.
        let _ = init_telemetry(&config);
        assert!(matches!(
            init_telemetry(&config),
            Err(TelemetryError::AlreadyInitialized(_))
        ));
    }
}
