//! # Domain Entities
//!
//! The address/transaction graph.
//!
//! ```text
//! Transaction ──owns──▶ Input  ──refs──▶ Address
//!      │                  └── previous_transaction_id (cross-reference)
//!      └──────owns──▶ Output ──refs──▶ Address
//! ```
//!
//! Entities are shared as `Arc`s and have no public constructors. An
//! [`Address`] is complete as soon as it exists. A [`Transaction`] starts as an
//! id-only shell registered in the [`EntityRegistry`](super::EntityRegistry)
//! and receives its inputs and outputs exactly once, atomically, when the
//! assembler finishes. Until then `inputs()` and `outputs()` are empty.

use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::OnceCell;

/// An address, identified by its chain-specific string encoding.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Address {
    id: String,
}

impl Address {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Encoded address string.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A transaction input, resolved to the output it spends.
#[derive(Debug)]
pub struct Input {
    transaction: Weak<Transaction>,
    address: Arc<Address>,
    previous_transaction_id: String,
    previous_output_index: u32,
    value: u64,
}

impl Input {
    pub(crate) fn new(
        transaction: Weak<Transaction>,
        address: Arc<Address>,
        previous_transaction_id: impl Into<String>,
        previous_output_index: u32,
        value: u64,
    ) -> Self {
        Self {
            transaction,
            address,
            previous_transaction_id: previous_transaction_id.into(),
            previous_output_index,
            value,
        }
    }

    /// Spending transaction, if the session still holds it.
    pub fn transaction(&self) -> Option<Arc<Transaction>> {
        self.transaction.upgrade()
    }

    /// Address that held the spent output.
    pub fn address(&self) -> &Arc<Address> {
        &self.address
    }

    /// Id of the transaction whose output this input spends.
    pub fn previous_transaction_id(&self) -> &str {
        &self.previous_transaction_id
    }

    /// Index of the spent output within the previous transaction.
    pub fn previous_output_index(&self) -> u32 {
        self.previous_output_index
    }

    /// Spent value in smallest units.
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// A transaction output.
#[derive(Debug)]
pub struct Output {
    transaction: Weak<Transaction>,
    address: Arc<Address>,
    index: u32,
    value: u64,
}

impl Output {
    pub(crate) fn new(
        transaction: Weak<Transaction>,
        address: Arc<Address>,
        index: u32,
        value: u64,
    ) -> Self {
        Self {
            transaction,
            address,
            index,
            value,
        }
    }

    /// Owning transaction, if the session still holds it.
    pub fn transaction(&self) -> Option<Arc<Transaction>> {
        self.transaction.upgrade()
    }

    /// Receiving address.
    pub fn address(&self) -> &Arc<Address> {
        &self.address
    }

    /// Position `n` within the owning transaction.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Value in smallest units.
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Inputs and outputs of an assembled transaction.
#[derive(Debug)]
pub(crate) struct TransactionDetail {
    pub(crate) inputs: Vec<Input>,
    pub(crate) outputs: Vec<Output>,
}

/// A transaction, identified by its hash.
#[derive(Debug)]
pub struct Transaction {
    id: String,
    detail: OnceCell<TransactionDetail>,
}

impl Transaction {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            detail: OnceCell::new(),
        }
    }

    /// Transaction hash.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether inputs and outputs have been populated.
    pub fn is_assembled(&self) -> bool {
        self.detail.initialized()
    }

    /// Inputs in node order. Empty until assembled.
    pub fn inputs(&self) -> &[Input] {
        self.detail
            .get()
            .map(|detail| detail.inputs.as_slice())
            .unwrap_or_default()
    }

    /// Outputs in node order. Empty until assembled.
    pub fn outputs(&self) -> &[Output] {
        self.detail
            .get()
            .map(|detail| detail.outputs.as_slice())
            .unwrap_or_default()
    }

    /// Output with position `n`.
    pub fn output(&self, index: u32) -> Option<&Output> {
        self.outputs().iter().find(|output| output.index == index)
    }

    /// Sum of input values, saturating at `u64::MAX`.
    pub fn total_input_value(&self) -> u64 {
        self.inputs()
            .iter()
            .fold(0, |total, input| total.saturating_add(input.value()))
    }

    /// Sum of output values, saturating at `u64::MAX`.
    pub fn total_output_value(&self) -> u64 {
        self.outputs()
            .iter()
            .fold(0, |total, output| total.saturating_add(output.value()))
    }

    pub(crate) fn detail_cell(&self) -> &OnceCell<TransactionDetail> {
        &self.detail
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembled(id: &str) -> Arc<Transaction> {
        let tx = Arc::new(Transaction::new(id));
        let addr = Arc::new(Address::new("addr1"));
        let detail = TransactionDetail {
            inputs: vec![Input::new(
                Arc::downgrade(&tx),
                addr.clone(),
                "prev",
                1,
                5_000_000,
            )],
            outputs: vec![
                Output::new(Arc::downgrade(&tx), addr.clone(), 0, 3_000_000),
                Output::new(Arc::downgrade(&tx), addr, 1, 1_500_000),
            ],
        };
        tx.detail_cell().set(detail).unwrap();
        tx
    }

    #[test]
    fn test_shell_transaction_is_empty() {
        let tx = Transaction::new("abcd");
        assert_eq!(tx.id(), "abcd");
        assert!(!tx.is_assembled());
        assert!(tx.inputs().is_empty());
        assert!(tx.outputs().is_empty());
        assert!(tx.output(0).is_none());
    }

    #[test]
    fn test_totals_saturate() {
        let tx = Arc::new(Transaction::new("big"));
        let addr = Arc::new(Address::new("addr1"));
        let half = u64::MAX / 2 + 1;
        let detail = TransactionDetail {
            inputs: vec![
                Input::new(Arc::downgrade(&tx), addr.clone(), "prev", 0, half),
                Input::new(Arc::downgrade(&tx), addr.clone(), "prev", 1, half),
            ],
            outputs: vec![
                Output::new(Arc::downgrade(&tx), addr.clone(), 0, half),
                Output::new(Arc::downgrade(&tx), addr, 1, half),
            ],
        };
        tx.detail_cell().set(detail).unwrap();

        assert_eq!(tx.total_input_value(), u64::MAX);
        assert_eq!(tx.total_output_value(), u64::MAX);
    }

    #[test]
    fn test_assembled_transaction_accessors() {
        let tx = assembled("t1");
        assert!(tx.is_assembled());
        assert_eq!(tx.inputs().len(), 1);
        assert_eq!(tx.output(1).unwrap().value(), 1_500_000);
        assert_eq!(tx.total_input_value(), 5_000_000);
        assert_eq!(tx.total_output_value(), 4_500_000);

        let input = &tx.inputs()[0];
        assert_eq!(input.previous_transaction_id(), "prev");
        assert_eq!(input.previous_output_index(), 1);
        assert_eq!(input.address().id(), "addr1");
    }

    #[test]
    fn test_back_reference_upgrades_to_owner() {
        let tx = assembled("t1");
        let owner = tx.outputs()[0].transaction().unwrap();
        assert!(Arc::ptr_eq(&owner, &tx));
        assert!(Arc::ptr_eq(&tx.inputs()[0].transaction().unwrap(), &tx));
    }

    #[test]
    fn test_detail_is_write_once() {
        let tx = assembled("t1");
        let again = TransactionDetail {
            inputs: vec![],
            outputs: vec![],
        };
        assert!(tx.detail_cell().set(again).is_err());
        assert_eq!(tx.outputs().len(), 2);
    }
}
