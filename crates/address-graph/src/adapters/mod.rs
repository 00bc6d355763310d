//! Adapters implementing the outbound ports over HTTP.

pub mod error_conversions;
pub mod history_http;
pub mod node_rpc;

pub use history_http::HttpHistorySource;
pub use node_rpc::JsonRpcNode;
