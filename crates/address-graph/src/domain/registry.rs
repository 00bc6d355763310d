//! # Entity Registry
//!
//! Session-scoped identity maps: one [`Address`] per address id and one
//! [`Transaction`] per transaction id.
//!
//! Get-or-create is atomic per key. Under concurrent access a single caller
//! constructs the entity and every other caller receives the same `Arc`.
//! Construction is synchronous and performs no I/O, so the registry can be
//! re-entered freely while another entity is being assembled.

use super::entities::{Address, Transaction};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// Identity map for one graph session.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    addresses: DashMap<String, Arc<Address>>,
    transactions: DashMap<String, Arc<Transaction>>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the address for `id`, creating it on first reference.
    pub fn get_or_create_address(&self, id: &str) -> Arc<Address> {
        if let Some(existing) = self.addresses.get(id) {
            return existing.value().clone();
        }
        self.addresses
            .entry(id.to_string())
            .or_insert_with(|| {
                trace!(address = id, "Registered address");
                Arc::new(Address::new(id))
            })
            .value()
            .clone()
    }

    /// Return the transaction for `id`, creating an id-only shell on first
    /// reference.
    pub fn get_or_create_transaction(&self, id: &str) -> Arc<Transaction> {
        if let Some(existing) = self.transactions.get(id) {
            return existing.value().clone();
        }
        self.transactions
            .entry(id.to_string())
            .or_insert_with(|| {
                trace!(txid = id, "Registered transaction");
                Arc::new(Transaction::new(id))
            })
            .value()
            .clone()
    }

    /// Look up an address without creating it.
    pub fn address(&self, id: &str) -> Option<Arc<Address>> {
        self.addresses.get(id).map(|entry| entry.value().clone())
    }

    /// Look up a transaction without creating it.
    pub fn transaction(&self, id: &str) -> Option<Arc<Transaction>> {
        self.transactions.get(id).map(|entry| entry.value().clone())
    }

    /// Number of registered addresses.
    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }

    /// Number of registered transactions, assembled or not.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
