//! # Inbound Ports
//!
//! API trait defining what the graph engine can do.

use crate::domain::{Address, GraphError, Transaction};
use async_trait::async_trait;
use std::sync::Arc;

/// Oldest-first transaction history of one address.
pub type History = Arc<[Arc<Transaction>]>;

/// Address graph API - inbound port.
#[async_trait]
pub trait AddressGraphApi: Send + Sync {
    /// Session-unique address for `id`. No I/O.
    fn get_or_create_address(&self, id: &str) -> Arc<Address>;

    /// Session-unique transaction for `id`, possibly not yet assembled. No I/O.
    fn get_or_create_transaction(&self, id: &str) -> Arc<Transaction>;

    /// Confirmed transactions touching `address`, oldest first.
    ///
    /// Cached for the session; a second call returns the same `History`.
    async fn get_transactions_for_address(&self, address: &Address) -> Result<History, GraphError>;

    /// Fully assembled transaction for `id`.
    async fn get_or_assemble_transaction(&self, id: &str) -> Result<Arc<Transaction>, GraphError>;

    /// Whether the node accepts `address`. Never cached.
    async fn is_valid_address(&self, address: &str) -> Result<bool, GraphError>;
}
