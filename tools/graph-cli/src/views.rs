//! JSON views of the assembled graph.

use address_graph::{units_to_coins, GraphStatsSnapshot, Transaction};
use serde::Serialize;

/// One input as printed.
#[derive(Debug, Serialize)]
pub struct InputView {
    pub address: String,
    pub previous_txid: String,
    pub previous_vout: u32,
    pub value: u64,
    pub coins: String,
}

/// One output as printed.
#[derive(Debug, Serialize)]
pub struct OutputView {
    pub index: u32,
    pub address: String,
    pub value: u64,
    pub coins: String,
}

/// One transaction as printed.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub txid: String,
    pub inputs: Vec<InputView>,
    pub outputs: Vec<OutputView>,
    pub total_in: u64,
    pub total_out: u64,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            txid: tx.id().to_string(),
            inputs: tx
                .inputs()
                .iter()
                .map(|input| InputView {
                    address: input.address().id().to_string(),
                    previous_txid: input.previous_transaction_id().to_string(),
                    previous_vout: input.previous_output_index(),
                    value: input.value(),
                    coins: units_to_coins(input.value()),
                })
                .collect(),
            outputs: tx
                .outputs()
                .iter()
                .map(|output| OutputView {
                    index: output.index(),
                    address: output.address().id().to_string(),
                    value: output.value(),
                    coins: units_to_coins(output.value()),
                })
                .collect(),
            total_in: tx.total_input_value(),
            total_out: tx.total_output_value(),
        }
    }
}

/// Output of `history`.
#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub address: String,
    pub transactions: Vec<TransactionView>,
    pub stats: GraphStatsSnapshot,
}

/// Output of `validate`.
#[derive(Debug, Serialize)]
pub struct ValidationView {
    pub address: String,
    pub isvalid: bool,
}
