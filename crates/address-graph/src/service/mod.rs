//! Service layer: assembler, history fetcher and the composed graph service.

pub mod assembler;
pub mod graph_service;
pub mod history;
pub mod stats;

pub use assembler::TransactionAssembler;
pub use graph_service::AddressGraphService;
pub use history::HistoryFetcher;
pub use stats::{GraphStats, GraphStatsSnapshot};
