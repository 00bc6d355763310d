//! # Address Graph
//!
//! Reconstructs the confirmed transaction history of an address and links
//! every transaction into an in-memory graph of addresses, inputs and
//! outputs.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Upstream Services
//!
//! | Service | Used for |
//! |---------|----------|
//! | Address-history HTTP | Newest-first pages of transaction summaries |
//! | Node JSON-RPC 1.0 | `getrawtransaction(txid, 1)`, `validateaddress` |
//!
//! ## Guarantees
//!
//! - One [`Address`] and one [`Transaction`] instance per id per session.
//! - Histories are oldest first, deduplicated, confirmed only, and cached
//!   per address once complete.
//! - Every [`Input`] carries the address and value of the exact output it
//!   spends.
//! - A failed assembly or history fetch leaves nothing partial behind.
//!
//! ## Module Structure
//!
//! ```text
//! address-graph/
//! ├── domain/      # Entities, registry, amounts, errors, GraphConfig
//! ├── ports/       # AddressGraphApi, AddressHistorySource, NodeRpc, wire records
//! ├── service/     # Assembler, history fetcher, AddressGraphService
//! ├── adapters/    # reqwest history client, JSON-RPC node client
//! └── config.rs    # TOML + environment session configuration
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use address_graph::{AddressGraphApi, AddressGraphConfig, AddressGraphService};
//! use address_graph::adapters::{HttpHistorySource, JsonRpcNode};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AddressGraphConfig::from_env()?;
//! let service = AddressGraphService::with_config(
//!     Arc::new(HttpHistorySource::new(&config.history)?),
//!     Arc::new(JsonRpcNode::new(&config.node)?),
//!     config.graph,
//! )?;
//!
//! let address = service.get_or_create_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
//! for tx in service.get_transactions_for_address(&address).await?.iter() {
//!     println!("{tx}: {} in, {} out", tx.total_input_value(), tx.total_output_value());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use config::{AddressGraphConfig, HistoryServiceConfig, NodeRpcConfig};
pub use domain::{
    coins_to_units, units_to_coins, Address, AmountError, ConfigError, EntityRegistry,
    GraphConfig, GraphError, Input, Output, Transaction, TransportError, COIN, MAX_MONEY,
};
pub use ports::{
    AddressGraphApi, AddressHistorySource, AddressValidation, History, HistoryPage,
    MockHistorySource, MockNode, NodeRpc, RawTransaction, TxSummary,
};
pub use service::{AddressGraphService, GraphStatsSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
