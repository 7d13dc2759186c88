//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the ledger interaction workflow.
//!
//! - `identity` - holder identity scoping every derived name
//! - `identifiers` - deterministic backend identifier derivation
//! - `digest` - fixed-length hex labels for arbitrary names
//! - `entities` - requests, results, and outcomes exchanged with the ledger
//!
//! No I/O happens in this module.

pub mod digest;
pub mod entities;
pub mod identifiers;
pub mod identity;

pub use digest::*;
pub use entities::*;
pub use identifiers::*;
pub use identity::*;
