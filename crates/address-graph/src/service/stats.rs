//! Session counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the fetcher and assembler of one session.
#[derive(Debug, Default)]
pub struct GraphStats {
    /// History pages fetched
    pub pages_fetched: AtomicU64,
    /// `getrawtransaction` calls issued
    pub raw_transactions_fetched: AtomicU64,
    /// Transactions fully assembled
    pub transactions_assembled: AtomicU64,
    /// Spent outputs resolved from already assembled transactions
    pub spends_resolved_from_graph: AtomicU64,
    /// History requests answered from the session cache
    pub history_cache_hits: AtomicU64,
}

impl GraphStats {
    pub(crate) fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> GraphStatsSnapshot {
        GraphStatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            raw_transactions_fetched: self.raw_transactions_fetched.load(Ordering::Relaxed),
            transactions_assembled: self.transactions_assembled.load(Ordering::Relaxed),
            spends_resolved_from_graph: self.spends_resolved_from_graph.load(Ordering::Relaxed),
            history_cache_hits: self.history_cache_hits.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`GraphStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct GraphStatsSnapshot {
    pub pages_fetched: u64,
    pub raw_transactions_fetched: u64,
    pub transactions_assembled: u64,
    pub spends_resolved_from_graph: u64,
    pub history_cache_hits: u64,
}
