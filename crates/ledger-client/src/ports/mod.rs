//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for talking to the remote ledger capability.
//!
//! - **Driven Ports (Outbound)**: `LedgerCapability`, `LedgerConnector`
//! - No concrete implementations in this module

pub mod outbound;

pub use outbound::*;
