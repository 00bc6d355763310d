//! Paginated History Fetcher
//!
//! Walks the address-history service page by page. Pages after the first are
//! requested at `page * (L - B)`, so each one re-reads the last `B` entries of
//! its predecessor; anything pushed onto the front of the list between two
//! requests shifts those entries but cannot open a gap. Duplicates from the
//! overlap are dropped by id.
//!
//! Upstream pages are newest first. The accumulated sequence is reversed
//! before it is cached and returned.

use crate::domain::{GraphConfig, GraphError, Transaction};
use crate::ports::{AddressHistorySource, History, NodeRpc, TxSummary};
use crate::service::assembler::TransactionAssembler;
use crate::service::stats::GraphStats;
use dashmap::DashMap;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Per-address history fetcher with a session cache.
pub struct HistoryFetcher<H: AddressHistorySource, N: NodeRpc> {
    source: Arc<H>,
    assembler: Arc<TransactionAssembler<N>>,
    stats: Arc<GraphStats>,
    config: GraphConfig,
    cache: DashMap<String, Arc<OnceCell<History>>>,
}

impl<H: AddressHistorySource, N: NodeRpc> HistoryFetcher<H, N> {
    /// Create a fetcher. `config` must already be validated.
    pub fn new(
        source: Arc<H>,
        assembler: Arc<TransactionAssembler<N>>,
        stats: Arc<GraphStats>,
        config: GraphConfig,
    ) -> Self {
        Self {
            source,
            assembler,
            stats,
            config,
            cache: DashMap::new(),
        }
    }

    /// Confirmed transactions of `address`, oldest first.
    ///
    /// Concurrent callers for the same address share one fetch. A failed fetch
    /// leaves nothing cached.
    pub async fn get_transactions(&self, address: &str) -> Result<History, GraphError> {
        let cell = self
            .cache
            .entry(address.to_string())
            .or_default()
            .value()
            .clone();

        if let Some(history) = cell.get() {
            GraphStats::record(&self.stats.history_cache_hits);
            debug!(address, transactions = history.len(), "History served from cache");
            return Ok(history.clone());
        }

        cell.get_or_try_init(|| self.fetch(address))
            .await
            .cloned()
            .inspect_err(|error| warn!(address, %error, "History fetch failed"))
    }

    /// Whether a complete history for `address` is cached.
    pub fn is_cached(&self, address: &str) -> bool {
        self.cache
            .get(address)
            .is_some_and(|cell| cell.initialized())
    }

    async fn fetch(&self, address: &str) -> Result<History, GraphError> {
        let limit = self.config.page_limit;
        let mut seen: HashSet<String> = HashSet::new();
        let mut newest_first: Vec<Arc<Transaction>> = Vec::new();
        let mut page = 0usize;

        loop {
            let offset = (page > 0).then(|| self.config.page_offset(page));
            let response = self.source.fetch_page(address, limit, offset).await?;
            GraphStats::record(&self.stats.pages_fetched);
            debug!(
                address,
                page,
                offset = offset.unwrap_or(0),
                returned = response.txs.len(),
                n_tx = response.n_tx,
                "Fetched history page"
            );

            if response.txs.is_empty() {
                break;
            }
            let n_tx = response.n_tx;

            let fresh: Vec<String> = response
                .txs
                .into_iter()
                .filter(TxSummary::is_confirmed)
                .map(|summary| summary.hash)
                .filter(|hash| seen.insert(hash.clone()))
                .collect();

            let assembled: Vec<Arc<Transaction>> = stream::iter(fresh)
                .map(|hash| async move { self.assembler.get_or_assemble(&hash).await })
                .buffered(self.config.max_concurrent_lookups.max(1))
                .try_collect()
                .await?;
            newest_first.extend(assembled);

            if page == 0 && n_tx <= limit as u64 {
                break;
            }
            page += 1;
        }

        newest_first.reverse();
        info!(
            address,
            pages = page + 1,
            transactions = newest_first.len(),
            "History assembled"
        );
        Ok(History::from(newest_first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityRegistry;
    use crate::ports::{MockHistorySource, MockNode, RawTransaction};

    fn node_for(ids: &[String]) -> MockNode {
        ids.iter().fold(MockNode::new(), |node, id| {
            node.with_transaction(id, RawTransaction::new(id.as_str()).with_output(0, "1", &["a"]))
        })
    }

    fn fetcher(
        source: MockHistorySource,
        node: MockNode,
    ) -> (HistoryFetcher<MockHistorySource, MockNode>, Arc<MockHistorySource>) {
        let source = Arc::new(source);
        let stats = Arc::new(GraphStats::default());
        let config = GraphConfig::default();
        let assembler = Arc::new(TransactionAssembler::new(
            Arc::new(node),
            Arc::new(EntityRegistry::new()),
            stats.clone(),
            &config,
        ));
        (
            HistoryFetcher::new(source.clone(), assembler, stats, config),
            source,
        )
    }

    fn newest_first(count: usize) -> (Vec<String>, Vec<TxSummary>) {
        let ids: Vec<String> = (0..count).map(|i| format!("tx{i:03}")).collect();
        let summaries = ids
            .iter()
            .enumerate()
            .map(|(i, id)| TxSummary::confirmed(id.clone(), (count - i) as u64))
            .collect();
        (ids, summaries)
    }

    #[tokio::test]
    async fn test_empty_address_fetches_one_page() {
        let (fetcher, source) = fetcher(MockHistorySource::new(), MockNode::new());

        let history = fetcher.get_transactions("empty").await.unwrap();
        assert!(history.is_empty());
        assert_eq!(source.requested_offsets(), vec![None]);
    }

    #[tokio::test]
    async fn test_offsets_advance_by_limit_minus_buffer() {
        let (ids, summaries) = newest_first(120);
        let (fetcher, source) =
            fetcher(MockHistorySource::new().with_history("A", summaries), node_for(&ids));

        let history = fetcher.get_transactions("A").await.unwrap();
        assert_eq!(history.len(), 120);
        assert_eq!(
            source.requested_offsets(),
            vec![None, Some(47), Some(94), Some(141)]
        );
    }

    #[tokio::test]
    async fn test_history_is_oldest_first() {
        let (ids, summaries) = newest_first(5);
        let (fetcher, _) =
            fetcher(MockHistorySource::new().with_history("A", summaries), node_for(&ids));

        let history = fetcher.get_transactions("A").await.unwrap();
        let order: Vec<&str> = history.iter().map(|tx| tx.id()).collect();
        assert_eq!(order, vec!["tx004", "tx003", "tx002", "tx001", "tx000"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let (ids, summaries) = newest_first(60);
        let source = MockHistorySource::new()
            .with_history("A", summaries)
            .failing_at_offset(47);
        let (fetcher, _) = fetcher(source, node_for(&ids));

        assert!(fetcher.get_transactions("A").await.is_err());
        assert!(!fetcher.is_cached("A"));
    }

    #[tokio::test]
    async fn test_second_call_uses_cache() {
        let (ids, summaries) = newest_first(3);
        let (fetcher, source) =
            fetcher(MockHistorySource::new().with_history("A", summaries), node_for(&ids));

        let first = fetcher.get_transactions("A").await.unwrap();
        let second = fetcher.get_transactions("A").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.requests().len(), 1);
        assert_eq!(fetcher.stats.snapshot().history_cache_hits, 1);
    }
}
