//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound dependencies) and the
//! typed wire records exchanged through them.

pub mod inbound;
pub mod outbound;
pub mod records;

pub use inbound::*;
pub use outbound::*;
pub use records::*;
