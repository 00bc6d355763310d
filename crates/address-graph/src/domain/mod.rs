//! # Domain Module
//!
//! Graph entities, the identity registry, monetary value objects, errors and
//! engine configuration. No I/O happens here.

pub mod config;
pub mod entities;
pub mod errors;
pub mod registry;
pub mod value_objects;

pub use config::*;
pub use entities::{Address, Input, Output, Transaction};
pub use errors::*;
pub use registry::EntityRegistry;
pub use value_objects::*;
