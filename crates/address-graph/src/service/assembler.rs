//! Transaction Graph Assembler
//!
//! Turns a transaction id into a fully linked [`Transaction`]: outputs point at
//! their receiving addresses, inputs point at the address and value of the
//! exact output they spend.
//!
//! ```text
//! get_or_assemble(T)
//!   ├─ registry: shell T (registered before any I/O)
//!   ├─ node: getrawtransaction(T)
//!   ├─ outputs: vout[n] → (first address, units)
//!   └─ inputs:  vin (prev, vout) → prev.outputs[vout]
//!                 prev already assembled  → read its Output list
//!                 otherwise               → getrawtransaction(prev), once per prev
//! ```
//!
//! The detail is published atomically through the transaction's write-once
//! cell. A failed assembly publishes nothing, so the registered shell stays
//! empty and the next lookup retries.

use crate::domain::entities::TransactionDetail;
use crate::domain::{Address, EntityRegistry, GraphConfig, GraphError, Input, Output, Transaction};
use crate::ports::{NodeRpc, RawOutput, RawTransaction};
use crate::service::stats::GraphStats;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Where a previous transaction's outputs are read from.
enum PreviousOutputs {
    /// Already in the graph.
    Assembled(Arc<Transaction>),
    /// Fetched from the node for this assembly only.
    Raw(RawTransaction),
}

/// Builds transactions on top of the session registry.
pub struct TransactionAssembler<N: NodeRpc> {
    node: Arc<N>,
    registry: Arc<EntityRegistry>,
    stats: Arc<GraphStats>,
    max_concurrent_lookups: usize,
}

impl<N: NodeRpc> TransactionAssembler<N> {
    /// Create an assembler over `registry`.
    pub fn new(
        node: Arc<N>,
        registry: Arc<EntityRegistry>,
        stats: Arc<GraphStats>,
        config: &GraphConfig,
    ) -> Self {
        Self {
            node,
            registry,
            stats,
            max_concurrent_lookups: config.max_concurrent_lookups.max(1),
        }
    }

    /// Return the assembled transaction for `txid`, assembling it on first use.
    ///
    /// Concurrent callers for the same id share one assembly.
    pub async fn get_or_assemble(&self, txid: &str) -> Result<Arc<Transaction>, GraphError> {
        let tx = self.registry.get_or_create_transaction(txid);
        if tx.is_assembled() {
            return Ok(tx);
        }

        tx.detail_cell()
            .get_or_try_init(|| self.assemble(&tx))
            .await
            .inspect_err(|error| warn!(txid, %error, "Transaction assembly failed"))?;
        Ok(tx)
    }

    async fn assemble(&self, tx: &Arc<Transaction>) -> Result<TransactionDetail, GraphError> {
        let txid = tx.id();
        debug!(txid, "Assembling transaction");

        let raw = self.fetch_raw(txid).await?;
        if let Some(reported) = raw.txid.as_deref() {
            if reported != txid {
                return Err(GraphError::malformed(
                    txid,
                    format!("node returned transaction {reported}"),
                ));
            }
        }

        let owner = Arc::downgrade(tx);
        let outputs = self.build_outputs(txid, &owner, &raw)?;
        let inputs = self.build_inputs(txid, &owner, &raw).await?;

        GraphStats::record(&self.stats.transactions_assembled);
        debug!(
            txid,
            inputs = inputs.len(),
            outputs = outputs.len(),
            "Transaction assembled"
        );
        Ok(TransactionDetail { inputs, outputs })
    }

    fn build_outputs(
        &self,
        txid: &str,
        owner: &Weak<Transaction>,
        raw: &RawTransaction,
    ) -> Result<Vec<Output>, GraphError> {
        let mut seen = HashSet::new();
        raw.vout
            .iter()
            .map(|raw_output| {
                if !seen.insert(raw_output.n) {
                    return Err(GraphError::malformed(
                        txid,
                        format!("duplicate output index {}", raw_output.n),
                    ));
                }
                let (address, value) = self
                    .resolve_output(raw_output)
                    .map_err(|reason| GraphError::malformed(txid, reason))?;
                Ok(Output::new(owner.clone(), address, raw_output.n, value))
            })
            .collect()
    }

    async fn build_inputs(
        &self,
        txid: &str,
        owner: &Weak<Transaction>,
        raw: &RawTransaction,
    ) -> Result<Vec<Input>, GraphError> {
        let mut spends: Vec<(&str, u32)> = Vec::with_capacity(raw.vin.len());
        let mut seen = HashSet::new();
        for (position, raw_input) in raw.vin.iter().enumerate() {
            if raw_input.is_coinbase() {
                trace!(txid, position, "Skipping coinbase input");
                continue;
            }
            let (Some(previous), Some(vout)) = (raw_input.txid.as_deref(), raw_input.vout) else {
                return Err(GraphError::malformed(
                    txid,
                    format!("input {position} has no previous outpoint"),
                ));
            };
            if !seen.insert((previous, vout)) {
                return Err(GraphError::malformed(
                    txid,
                    format!("input {position} spends {previous}:{vout} twice"),
                ));
            }
            spends.push((previous, vout));
        }

        let mut distinct: Vec<String> = Vec::new();
        let mut queued = HashSet::new();
        for (previous, _) in &spends {
            if queued.insert(*previous) {
                distinct.push(previous.to_string());
            }
        }

        let previous_outputs: HashMap<String, PreviousOutputs> = stream::iter(distinct)
            .map(|previous| async move {
                let outputs = self.previous_outputs(&previous).await?;
                Ok::<_, GraphError>((previous, outputs))
            })
            .buffer_unordered(self.max_concurrent_lookups)
            .try_collect()
            .await?;

        spends
            .into_iter()
            .map(|(previous, vout)| {
                let (address, value) = match previous_outputs.get(previous) {
                    Some(PreviousOutputs::Assembled(prev)) => prev
                        .output(vout)
                        .map(|output| (output.address().clone(), output.value())),
                    Some(PreviousOutputs::Raw(prev)) => prev
                        .vout
                        .iter()
                        .find(|raw_output| raw_output.n == vout)
                        .map(|raw_output| {
                            self.resolve_output(raw_output).map_err(|reason| {
                                GraphError::malformed(
                                    txid,
                                    format!("spent output {previous}:{vout}: {reason}"),
                                )
                            })
                        })
                        .transpose()?,
                    None => None,
                }
                .ok_or_else(|| {
                    GraphError::malformed(
                        txid,
                        format!("spent output {previous}:{vout} does not exist"),
                    )
                })?;
                Ok(Input::new(owner.clone(), address, previous, vout, value))
            })
            .collect()
    }

    async fn previous_outputs(&self, previous: &str) -> Result<PreviousOutputs, GraphError> {
        if let Some(prev) = self.registry.transaction(previous) {
            if prev.is_assembled() {
                GraphStats::record(&self.stats.spends_resolved_from_graph);
                trace!(previous, "Previous transaction already in graph");
                return Ok(PreviousOutputs::Assembled(prev));
            }
        }
        self.fetch_raw(previous).await.map(PreviousOutputs::Raw)
    }

    /// Address and unit value of a raw output, per the first-address policy.
    fn resolve_output(&self, raw_output: &RawOutput) -> Result<(Arc<Address>, u64), String> {
        let address = raw_output
            .script_pub_key
            .first_address()
            .ok_or_else(|| format!("output {} has no resolvable address", raw_output.n))?;
        let value = raw_output
            .value
            .units()
            .map_err(|error| format!("output {}: {error}", raw_output.n))?;
        Ok((self.registry.get_or_create_address(address), value))
    }

    async fn fetch_raw(&self, txid: &str) -> Result<RawTransaction, GraphError> {
        GraphStats::record(&self.stats.raw_transactions_fetched);
        self.node.get_raw_transaction(txid).await.map_err(|error| {
            warn!(txid, %error, "getrawtransaction failed");
            GraphError::from(error)
        })
    }
}
