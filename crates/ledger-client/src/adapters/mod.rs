//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the ledger workflow to concrete ledger clients.
//!
//! - `json_rpc` - JSON-RPC 2.0 over HTTP against a ledger server
//! - `in_memory` - process-local ledger for dry runs and tests
//! - `rpc_types` - JSON-RPC envelopes and method payloads

pub mod in_memory;
pub mod json_rpc;
pub mod rpc_types;

pub use in_memory::*;
pub use json_rpc::*;
pub use rpc_types::*;
