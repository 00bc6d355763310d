//! graph-cli: reconstruct and print the transaction graph of an address.
//!
//! ## Usage
//!
//! ```bash
//! # Full history of an address, oldest first
//! graph-cli --node-user rpc --node-password secret history 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa
//!
//! # One assembled transaction
//! graph-cli --config graph.toml tx 4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b
//!
//! # Ask the node whether an address is valid
//! graph-cli validate invalidstring
//! ```

mod views;

use std::path::PathBuf;
use std::sync::Arc;

use address_graph::adapters::{HttpHistorySource, JsonRpcNode};
use address_graph::{AddressGraphApi, AddressGraphConfig, AddressGraphService};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graph_telemetry::{address_span, init_telemetry, TelemetryConfig};
use serde::Serialize;
use tracing::Instrument;

use views::{HistoryView, TransactionView, ValidationView};

/// Address history graph explorer
#[derive(Parser, Debug)]
#[command(name = "graph-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Address-history service base URL
    #[arg(long)]
    history_url: Option<String>,

    /// Node JSON-RPC endpoint URL
    #[arg(long)]
    node_url: Option<String>,

    /// Node RPC username
    #[arg(long)]
    node_user: Option<String>,

    /// Node RPC password
    #[arg(long)]
    node_password: Option<String>,

    /// Skip TLS certificate verification for the history service
    #[arg(long)]
    insecure: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Confirmed transactions of an address, oldest first
    History {
        /// Address id
        address: String,
    },
    /// One fully assembled transaction
    Tx {
        /// Transaction id
        txid: String,
    },
    /// Node verdict on an address string
    Validate {
        /// Address string
        address: String,
    },
}

impl Args {
    /// File, then environment, then flags.
    fn load_config(&self) -> Result<AddressGraphConfig> {
        let mut config = match &self.config {
            Some(path) => AddressGraphConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => AddressGraphConfig::default(),
        };
        config
            .apply_env(|key| std::env::var(key).ok())
            .context("Invalid environment configuration")?;

        if let Some(url) = &self.history_url {
            config.history.base_url = url.clone();
        }
        if let Some(url) = &self.node_url {
            config.node.url = url.clone();
        }
        if let Some(user) = &self.node_user {
            config.node.username = user.clone();
        }
        if let Some(password) = &self.node_password {
            config.node.password = password.clone();
        }
        if self.insecure {
            config.history.accept_invalid_certs = true;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if args.verbose {
        telemetry = telemetry.with_log_level("debug");
    }
    init_telemetry(&telemetry).context("Failed to initialize logging")?;

    let config = args.load_config()?;
    let service = AddressGraphService::with_config(
        Arc::new(HttpHistorySource::new(&config.history).context("History client")?),
        Arc::new(JsonRpcNode::new(&config.node).context("Node client")?),
        config.graph.clone(),
    )?;

    match args.command {
        Command::History { address } => {
            let entity = service.get_or_create_address(&address);
            let history = service
                .get_transactions_for_address(&entity)
                .instrument(address_span!("history", address))
                .await
                .with_context(|| format!("Failed to fetch history of {address}"))?;

            print_json(&HistoryView {
                transactions: history.iter().map(|tx| TransactionView::from(tx.as_ref())).collect(),
                address,
                stats: service.stats(),
            })
        }
        Command::Tx { txid } => {
            let tx = service
                .get_or_assemble_transaction(&txid)
                .await
                .with_context(|| format!("Failed to assemble {txid}"))?;
            print_json(&TransactionView::from(tx.as_ref()))
        }
        Command::Validate { address } => {
            let isvalid = service
                .is_valid_address(&address)
                .await
                .with_context(|| format!("Failed to validate {address}"))?;
            print_json(&ValidationView { address, isvalid })
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "graph-cli",
            "--history-url",
            "https://history.test/rawaddr",
            "--node-user",
            "alice",
            "--insecure",
            "tx",
            "abcd",
        ]);
        let config = args.load_config().unwrap();

        assert_eq!(config.history.base_url, "https://history.test/rawaddr");
        assert_eq!(config.node.username, "alice");
        assert!(config.history.accept_invalid_certs);
        assert!(matches!(args.command, Command::Tx { ref txid } if txid == "abcd"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["graph-cli"]).is_err());
    }
}
