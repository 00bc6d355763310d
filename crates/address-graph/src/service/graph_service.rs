//! # Address Graph Service
//!
//! One graph session: the identity registry, the history fetcher, the
//! transaction assembler and the address validator wired over the two
//! outbound ports.

use crate::domain::{Address, EntityRegistry, GraphConfig, GraphError, Transaction};
use crate::ports::{AddressGraphApi, AddressHistorySource, History, NodeRpc};
use crate::service::assembler::TransactionAssembler;
use crate::service::history::HistoryFetcher;
use crate::service::stats::{GraphStats, GraphStatsSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Address graph service.
///
/// Every entity handed out by one service instance is unique per id for the
/// lifetime of that instance. Separate instances share nothing.
pub struct AddressGraphService<H: AddressHistorySource, N: NodeRpc> {
    node: Arc<N>,
    registry: Arc<EntityRegistry>,
    assembler: Arc<TransactionAssembler<N>>,
    history: HistoryFetcher<H, N>,
    stats: Arc<GraphStats>,
    config: GraphConfig,
}

impl<H: AddressHistorySource, N: NodeRpc> AddressGraphService<H, N> {
    /// Create a service with default pagination settings.
    pub fn new(source: Arc<H>, node: Arc<N>) -> Result<Self, GraphError> {
        Self::with_config(source, node, GraphConfig::default())
    }

    /// Create a service with custom settings.
    pub fn with_config(
        source: Arc<H>,
        node: Arc<N>,
        config: GraphConfig,
    ) -> Result<Self, GraphError> {
        config.validate()?;

        let registry = Arc::new(EntityRegistry::new());
        let stats = Arc::new(GraphStats::default());
        let assembler = Arc::new(TransactionAssembler::new(
            node.clone(),
            registry.clone(),
            stats.clone(),
            &config,
        ));
        let history = HistoryFetcher::new(source, assembler.clone(), stats.clone(), config.clone());

        info!(
            page_limit = config.page_limit,
            overlap_buffer = config.overlap_buffer,
            max_concurrent_lookups = config.max_concurrent_lookups,
            "Address graph session started"
        );

        Ok(Self {
            node,
            registry,
            assembler,
            history,
            stats,
            config,
        })
    }

    /// The session registry.
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Session counters.
    pub fn stats(&self) -> GraphStatsSnapshot {
        self.stats.snapshot()
    }

    /// Active configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }
}

#[async_trait]
impl<H: AddressHistorySource, N: NodeRpc> AddressGraphApi for AddressGraphService<H, N> {
    fn get_or_create_address(&self, id: &str) -> Arc<Address> {
        self.registry.get_or_create_address(id)
    }

    fn get_or_create_transaction(&self, id: &str) -> Arc<Transaction> {
        self.registry.get_or_create_transaction(id)
    }

    async fn get_transactions_for_address(&self, address: &Address) -> Result<History, GraphError> {
        self.history.get_transactions(address.id()).await
    }

    async fn get_or_assemble_transaction(&self, id: &str) -> Result<Arc<Transaction>, GraphError> {
        self.assembler.get_or_assemble(id).await
    }

    async fn is_valid_address(&self, address: &str) -> Result<bool, GraphError> {
        let validation = self.node.validate_address(address).await?;
        debug!(address, valid = validation.isvalid, "validateaddress");
        Ok(validation.isvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;
    use crate::ports::{MockHistorySource, MockNode};

    fn service(node: MockNode) -> AddressGraphService<MockHistorySource, MockNode> {
        AddressGraphService::new(Arc::new(MockHistorySource::new()), Arc::new(node)).unwrap()
    }

    #[test]
    fn test_rejects_buffer_not_below_limit() {
        let config = GraphConfig {
            page_limit: 3,
            overlap_buffer: 3,
            ..GraphConfig::default()
        };
        let result = AddressGraphService::with_config(
            Arc::new(MockHistorySource::new()),
            Arc::new(MockNode::new()),
            config,
        );
        assert!(matches!(
            result.err(),
            Some(GraphError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_identity_through_api() {
        let service = service(MockNode::new());
        let a = service.get_or_create_address("addr1");
        let b = service.get_or_create_address("addr1");
        assert!(Arc::ptr_eq(&a, &b));

        let t = service.get_or_create_transaction("T");
        assert!(Arc::ptr_eq(&t, &service.get_or_create_transaction("T")));
        assert!(!t.is_assembled());
    }

    #[tokio::test]
    async fn test_invalid_address_is_false() {
        let service =
            service(MockNode::new().with_valid_address("1BoatSLRHtKNngkdXEeobR76b53LETtpyT"));

        assert!(!service.is_valid_address("invalidstring").await.unwrap());
        assert!(service
            .is_valid_address("1BoatSLRHtKNngkdXEeobR76b53LETtpyT")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_validation_is_never_cached() {
        let node = Arc::new(MockNode::new());
        let service =
            AddressGraphService::new(Arc::new(MockHistorySource::new()), node.clone()).unwrap();

        service.is_valid_address("x").await.unwrap();
        service.is_valid_address("x").await.unwrap();
        assert_eq!(node.validation_count(), 2);
    }
}
