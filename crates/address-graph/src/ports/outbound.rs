//! # Outbound Ports
//!
//! Traits for the two upstream services, plus in-memory mocks.

use super::records::{AddressValidation, HistoryPage, RawTransaction, TxSummary};
use crate::domain::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Address-history HTTP service - outbound port.
#[async_trait]
pub trait AddressHistorySource: Send + Sync {
    /// Fetch one newest-first page of summaries for `address`.
    ///
    /// `offset` is `None` for the first page, which is requested without an
    /// `offset` parameter.
    async fn fetch_page(
        &self,
        address: &str,
        limit: usize,
        offset: Option<usize>,
    ) -> Result<HistoryPage, TransportError>;
}

/// Full-node JSON-RPC service - outbound port.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// `getrawtransaction(txid, 1)`.
    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransaction, TransportError>;

    /// `validateaddress(address)`.
    async fn validate_address(&self, address: &str) -> Result<AddressValidation, TransportError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A page request seen by [`MockHistorySource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested address.
    pub address: String,
    /// Requested page size.
    pub limit: usize,
    /// Requested offset (`None` on the first page).
    pub offset: Option<usize>,
}

/// Mock address-history service serving newest-first lists from memory.
#[derive(Default)]
pub struct MockHistorySource {
    /// Full newest-first history per address.
    histories: Mutex<HashMap<String, Vec<TxSummary>>>,
    /// Summaries prepended to an address's history after its first page is
    /// served, simulating blocks mined between page fetches.
    arrivals: Mutex<HashMap<String, Vec<TxSummary>>>,
    /// Offsets that fail with a connection error.
    failing_offsets: HashSet<usize>,
    /// Every request served, in order.
    requests: Mutex<Vec<PageRequest>>,
}

impl MockHistorySource {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `summaries` (newest first) for `address`.
    pub fn with_history(self, address: &str, summaries: Vec<TxSummary>) -> Self {
        self.histories.lock().insert(address.to_string(), summaries);
        self
    }

    /// Prepend `summaries` to `address`'s history right after its first page.
    pub fn with_arrivals_after_first_page(self, address: &str, summaries: Vec<TxSummary>) -> Self {
        self.arrivals.lock().insert(address.to_string(), summaries);
        self
    }

    /// Fail requests at `offset`.
    pub fn failing_at_offset(mut self, offset: usize) -> Self {
        self.failing_offsets.insert(offset);
        self
    }

    /// Requests served so far.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().clone()
    }

    /// Offsets requested so far, `None` for first pages.
    pub fn requested_offsets(&self) -> Vec<Option<usize>> {
        self.requests.lock().iter().map(|r| r.offset).collect()
    }
}

#[async_trait]
impl AddressHistorySource for MockHistorySource {
    async fn fetch_page(
        &self,
        address: &str,
        limit: usize,
        offset: Option<usize>,
    ) -> Result<HistoryPage, TransportError> {
        self.requests.lock().push(PageRequest {
            address: address.to_string(),
            limit,
            offset,
        });

        let start = offset.unwrap_or(0);
        if self.failing_offsets.contains(&start) {
            return Err(TransportError::Connection(format!(
                "mock failure at offset {start}"
            )));
        }

        let mut histories = self.histories.lock();
        let history = histories.entry(address.to_string()).or_default();
        let txs: Vec<TxSummary> = history.iter().skip(start).take(limit).cloned().collect();
        let page = HistoryPage {
            n_tx: history.len() as u64,
            txs,
        };

        if offset.is_none() {
            if let Some(mut arrived) = self.arrivals.lock().remove(address) {
                arrived.append(history);
                *history = arrived;
            }
        }

        Ok(page)
    }
}

/// Mock node serving raw transactions from memory.
#[derive(Default)]
pub struct MockNode {
    /// Raw transactions by id.
    transactions: HashMap<String, RawTransaction>,
    /// Addresses `validateaddress` accepts.
    valid_addresses: HashSet<String>,
    /// Transaction ids whose lookup fails with a connection error.
    failing_txids: HashSet<String>,
    /// Every `getrawtransaction` id requested, in order.
    raw_requests: Mutex<Vec<String>>,
    /// Every `validateaddress` argument, in order.
    validation_requests: Mutex<Vec<String>>,
}

impl MockNode {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `raw` for `txid`.
    pub fn with_transaction(mut self, txid: &str, raw: RawTransaction) -> Self {
        self.transactions.insert(txid.to_string(), raw);
        self
    }

    /// Accept `address` in `validateaddress`.
    pub fn with_valid_address(mut self, address: &str) -> Self {
        self.valid_addresses.insert(address.to_string());
        self
    }

    /// Fail `getrawtransaction` for `txid`.
    pub fn failing_for(mut self, txid: &str) -> Self {
        self.failing_txids.insert(txid.to_string());
        self
    }

    /// `getrawtransaction` ids requested so far.
    pub fn raw_requests(&self) -> Vec<String> {
        self.raw_requests.lock().clone()
    }

    /// How many times `txid` was fetched.
    pub fn raw_request_count(&self, txid: &str) -> usize {
        self.raw_requests.lock().iter().filter(|id| *id == txid).count()
    }

    /// `validateaddress` calls so far.
    pub fn validation_count(&self) -> usize {
        self.validation_requests.lock().len()
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransaction, TransportError> {
        self.raw_requests.lock().push(txid.to_string());

        if self.failing_txids.contains(txid) {
            return Err(TransportError::Connection(format!("mock failure for {txid}")));
        }

        self.transactions
            .get(txid)
            .cloned()
            .ok_or_else(|| TransportError::Rpc {
                code: -5,
                message: "No such mempool or blockchain transaction".to_string(),
            })
    }

    async fn validate_address(&self, address: &str) -> Result<AddressValidation, TransportError> {
        self.validation_requests.lock().push(address.to_string());
        let isvalid = self.valid_addresses.contains(address);
        Ok(AddressValidation {
            isvalid,
            address: isvalid.then(|| address.to_string()),
        })
    }
}
