//! Session configuration: pagination settings plus the two upstream endpoints.
//!
//! # Config File Format
//!
//! ```toml
//! [graph]
//! page_limit = 50
//! overlap_buffer = 3
//! max_concurrent_lookups = 8
//!
//! [history]
//! base_url = "https://blockchain.info/rawaddr"
//! accept_invalid_certs = false
//! timeout_secs = 30
//!
//! [node]
//! url = "http://127.0.0.1:8332"
//! username = "rpcuser"
//! password = "rpcpassword"
//! timeout_secs = 30
//! ```
//!
//! Every table and key is optional. Environment variables override the file.

use crate::domain::{ConfigError, GraphConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Default address-history endpoint.
pub const DEFAULT_HISTORY_URL: &str = "https://blockchain.info/rawaddr";

/// Default node JSON-RPC endpoint.
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:8332";

/// Default per-request timeout for both services.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Address-history HTTP service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryServiceConfig {
    /// Base URL; the address id is appended as the last path segment.
    pub base_url: String,
    /// Skip TLS certificate verification. Compatibility knob, off by default.
    pub accept_invalid_certs: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HistoryServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HISTORY_URL.to_string(),
            accept_invalid_certs: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Node JSON-RPC settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRpcConfig {
    /// Endpoint URL.
    pub url: String,
    /// RPC username.
    pub username: String,
    /// RPC password.
    pub password: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NodeRpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NODE_URL.to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for NodeRpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRpcConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Complete configuration for one client session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressGraphConfig {
    /// Pagination and concurrency.
    pub graph: GraphConfig,
    /// Address-history service.
    pub history: HistoryServiceConfig,
    /// Node JSON-RPC service.
    pub node: NodeRpcConfig,
}

impl AddressGraphConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay `GRAPH_*` variables read through `lookup`.
    ///
    /// # Variables
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `GRAPH_HISTORY_URL` | `history.base_url` |
    /// | `GRAPH_ACCEPT_INVALID_CERTS` | `history.accept_invalid_certs` |
    /// | `GRAPH_NODE_URL` | `node.url` |
    /// | `GRAPH_NODE_USER` | `node.username` |
    /// | `GRAPH_NODE_PASSWORD` | `node.password` |
    /// | `GRAPH_PAGE_LIMIT` | `graph.page_limit` |
    /// | `GRAPH_OVERLAP_BUFFER` | `graph.overlap_buffer` |
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GRAPH_HISTORY_URL") {
            self.history.base_url = url;
        }
        if let Some(flag) = lookup("GRAPH_ACCEPT_INVALID_CERTS") {
            self.history.accept_invalid_certs = flag.to_lowercase() == "true" || flag == "1";
        }
        if let Some(url) = lookup("GRAPH_NODE_URL") {
            self.node.url = url;
        }
        if let Some(user) = lookup("GRAPH_NODE_USER") {
            self.node.username = user;
        }
        if let Some(password) = lookup("GRAPH_NODE_PASSWORD") {
            self.node.password = password;
        }
        if let Some(limit) = lookup("GRAPH_PAGE_LIMIT") {
            self.graph.page_limit = parse_number("GRAPH_PAGE_LIMIT", &limit)?;
        }
        if let Some(buffer) = lookup("GRAPH_OVERLAP_BUFFER") {
            self.graph.overlap_buffer = parse_number("GRAPH_OVERLAP_BUFFER", &buffer)?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.graph.validate()?;

        if self.history.base_url.is_empty() {
            return Err(ConfigError::Invalid("history.base_url is empty".to_string()));
        }
        if self.node.url.is_empty() {
            return Err(ConfigError::Invalid("node.url is empty".to_string()));
        }
        if self.history.timeout_secs == 0 || self.node.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key} is not a number: {value}")))
}
