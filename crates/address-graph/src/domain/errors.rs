//! # Domain Errors
//!
//! Error taxonomy for graph assembly.
//!
//! - [`TransportError`]: either upstream service could not be reached or
//!   answered with something that is not a usable response. Never recovered
//!   locally.
//! - [`GraphError::MalformedResponse`]: the response decoded, but its content
//!   cannot be turned into a correct graph (missing spent output, script with
//!   no address, bad amount, duplicate entries).
//!
//! Address validation reports a boolean and has no error variant of its own.

use thiserror::Error;

/// Failure talking to the address-history service or the node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection could not be established (DNS, refused, TLS handshake).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request timed out at the transport layer.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Upstream answered with a non-success HTTP status.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Node returned a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message reported by the node
        message: String,
    },

    /// Body could not be decoded into the expected record.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Any other request failure.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Failure converting a decimal coin amount into integer units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Value was empty.
    #[error("amount is empty")]
    Empty,

    /// Value was negative.
    #[error("amount is negative: {0}")]
    Negative(String),

    /// Value is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),

    /// Value does not fit in 64-bit units.
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field has an unusable value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Config file could not be read.
    #[error("Failed to read {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },

    /// Config file could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Errors surfaced by the graph engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Upstream transport failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Upstream content cannot form a correct graph.
    #[error("Malformed response for {txid}: {reason}")]
    MalformedResponse {
        /// Transaction (or address) whose data was malformed
        txid: String,
        /// What was wrong with it
        reason: String,
    },

    /// Engine configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GraphError {
    /// Build a [`GraphError::MalformedResponse`].
    pub fn malformed(txid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            txid: txid.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_error_display() {
        let err = GraphError::malformed("abcd", "output index 3 not found");
        assert!(err.to_string().contains("abcd"));
        assert!(err.to_string().contains("output index 3"));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_error_converts() {
        let err: GraphError = TransportError::Rpc {
            code: -5,
            message: "No such mempool or blockchain transaction".to_string(),
        }
        .into();
        assert!(err.is_transport());
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_status_error_display() {
        let err = TransportError::Status {
            status: 429,
            url: "https://history.example/addr".to_string(),
        };
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: GraphError =
            ConfigError::Invalid("overlap_buffer must be < page_limit".into()).into();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: overlap_buffer must be < page_limit"
        );
    }
}
