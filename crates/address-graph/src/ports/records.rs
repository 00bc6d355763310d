//! # Wire Records
//!
//! Typed shapes of the two upstream responses. Adapters decode into these
//! records; the engine never reads untyped JSON.
//!
//! Address-history page (`GET {base}/{address}?limit=L&offset=O`):
//!
//! ```json
//! { "n_tx": 60, "txs": [ { "hash": "…", "block_height": 812345 } ] }
//! ```
//!
//! Node `getrawtransaction(txid, 1)`:
//!
//! ```json
//! { "txid": "…",
//!   "vin":  [ { "txid": "…", "vout": 1 } ],
//!   "vout": [ { "n": 0, "value": 0.05, "scriptPubKey": { "addresses": ["…"] } } ] }
//! ```

use crate::domain::{coins_to_units, AmountError};
use serde::{Deserialize, Deserializer, Serialize};

/// One page of an address's transaction list, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Transaction summaries on this page.
    #[serde(default)]
    pub txs: Vec<TxSummary>,
    /// Total number of transactions the service knows for the address.
    pub n_tx: u64,
}

/// Summary entry on a history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSummary {
    /// Transaction hash.
    pub hash: String,
    /// Height of the including block. Absent for mempool transactions.
    #[serde(default)]
    pub block_height: Option<u64>,
}

impl TxSummary {
    /// Summary of a transaction mined at `height`.
    pub fn confirmed(hash: impl Into<String>, height: u64) -> Self {
        Self {
            hash: hash.into(),
            block_height: Some(height),
        }
    }

    /// Summary of a mempool transaction.
    pub fn unconfirmed(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            block_height: None,
        }
    }

    /// Whether the service reports a block height for it.
    pub fn is_confirmed(&self) -> bool {
        self.block_height.is_some()
    }
}

/// Verbose raw transaction as returned by `getrawtransaction(txid, 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction id echoed by the node.
    #[serde(default)]
    pub txid: Option<String>,
    /// Inputs in node order.
    #[serde(default)]
    pub vin: Vec<RawInput>,
    /// Outputs in node order.
    #[serde(default)]
    pub vout: Vec<RawOutput>,
}

impl RawTransaction {
    /// Empty raw transaction echoing `txid`.
    pub fn new(txid: impl Into<String>) -> Self {
        Self {
            txid: Some(txid.into()),
            ..Self::default()
        }
    }

    /// Append an input spending `previous_txid:vout`.
    pub fn with_input(mut self, previous_txid: impl Into<String>, vout: u32) -> Self {
        self.vin.push(RawInput {
            txid: Some(previous_txid.into()),
            vout: Some(vout),
            coinbase: None,
        });
        self
    }

    /// Append a coinbase input.
    pub fn with_coinbase(mut self, script: impl Into<String>) -> Self {
        self.vin.push(RawInput {
            txid: None,
            vout: None,
            coinbase: Some(script.into()),
        });
        self
    }

    /// Append output `n` paying `value` coins to `addresses`.
    pub fn with_output(mut self, n: u32, value: &str, addresses: &[&str]) -> Self {
        self.vout.push(RawOutput {
            n,
            value: CoinAmount::from(value),
            script_pub_key: ScriptPubKey {
                addresses: addresses.iter().map(|a| a.to_string()).collect(),
                address: None,
            },
        });
        self
    }
}

/// Raw input entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    /// Id of the transaction being spent. Absent on coinbase inputs.
    #[serde(default)]
    pub txid: Option<String>,
    /// Index of the spent output. Absent on coinbase inputs.
    #[serde(default)]
    pub vout: Option<u32>,
    /// Coinbase script, present only on coinbase inputs.
    #[serde(default)]
    pub coinbase: Option<String>,
}

impl RawInput {
    /// Whether this input creates new coins rather than spending an output.
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.is_some()
    }
}

/// Raw output entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutput {
    /// Output index.
    pub n: u32,
    /// Value in decimal coins.
    pub value: CoinAmount,
    /// Locking script summary.
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

/// Locking script summary carrying the decoded destination(s).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScriptPubKey {
    /// Destinations, as reported by older nodes.
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Single destination, as reported by newer nodes.
    #[serde(default)]
    pub address: Option<String>,
}

impl ScriptPubKey {
    /// Address credited by this script.
    ///
    /// Multi-destination scripts (bare multisig) resolve to their first
    /// listed address; the remaining keys are not modelled. `None` means the
    /// script has no decodable destination.
    pub fn first_address(&self) -> Option<&str> {
        self.addresses
            .first()
            .map(String::as_str)
            .or(self.address.as_deref())
            .filter(|address| !address.is_empty())
    }
}

/// Decimal coin amount kept as its textual form until converted to units.
///
/// Deserializes from a JSON number or string, so no value passes through
/// binary floating point before [`CoinAmount::units`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoinAmount(String);

impl CoinAmount {
    /// Value in smallest units.
    pub fn units(&self) -> Result<u64, AmountError> {
        coins_to_units(&self.0)
    }

    /// Decimal text as received.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CoinAmount {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl<'de> Deserialize<'de> for CoinAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(number) => Self(number.to_string()),
            Repr::Text(text) => Self(text),
        })
    }
}

/// Result of `validateaddress(address)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressValidation {
    /// Whether the node accepts the address.
    pub isvalid: bool,
    /// Normalized address, present when valid.
    #[serde(default)]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_page_decodes() {
        let json = r#"{
            "hash160": "ignored",
            "n_tx": 2,
            "txs": [
                { "hash": "bb", "block_height": 812345, "fee": 100 },
                { "hash": "aa" }
            ]
        }"#;
        let page: HistoryPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.n_tx, 2);
        assert!(page.txs[0].is_confirmed());
        assert!(!page.txs[1].is_confirmed());
    }

    #[test]
    fn test_null_block_height_is_unconfirmed() {
        let summary: TxSummary =
            serde_json::from_str(r#"{ "hash": "aa", "block_height": null }"#).unwrap();
        assert!(!summary.is_confirmed());
    }

    #[test]
    fn test_raw_transaction_decodes() {
        let json = r#"{
            "txid": "t1",
            "vin": [
                { "txid": "p1", "vout": 1, "scriptSig": { "hex": "00" }, "sequence": 4294967295 },
                { "coinbase": "03abcdef", "sequence": 0 }
            ],
            "vout": [
                { "n": 0, "value": 0.05, "scriptPubKey": { "addresses": ["addr1", "addr2"] } },
                { "n": 1, "value": 1e-8, "scriptPubKey": { "address": "addr3" } }
            ]
        }"#;
        let raw: RawTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(raw.vin[0].txid.as_deref(), Some("p1"));
        assert_eq!(raw.vin[0].vout, Some(1));
        assert!(raw.vin[1].is_coinbase());
        assert_eq!(raw.vout[0].value.units().unwrap(), 5_000_000);
        assert_eq!(raw.vout[1].value.units().unwrap(), 1);
        assert_eq!(raw.vout[0].script_pub_key.first_address(), Some("addr1"));
        assert_eq!(raw.vout[1].script_pub_key.first_address(), Some("addr3"));
    }

    #[test]
    fn test_string_amount_decodes() {
        let output: RawOutput = serde_json::from_str(
            r#"{ "n": 0, "value": "0.00012345", "scriptPubKey": {} }"#,
        )
        .unwrap();
        assert_eq!(output.value.units().unwrap(), 12_345);
        assert_eq!(output.script_pub_key.first_address(), None);
    }

    #[test]
    fn test_address_validation_decodes() {
        let invalid: AddressValidation = serde_json::from_str(r#"{ "isvalid": false }"#).unwrap();
        assert!(!invalid.isvalid);
        assert!(invalid.address.is_none());
    }

    #[test]
    fn test_builder_helpers() {
        let raw = RawTransaction::new("t1")
            .with_coinbase("04ffff")
            .with_input("p1", 0)
            .with_output(0, "0.5", &["addr1"]);
        assert_eq!(raw.txid.as_deref(), Some("t1"));
        assert_eq!(raw.vin.len(), 2);
        assert_eq!(raw.vout[0].value.as_str(), "0.5");
    }
}
