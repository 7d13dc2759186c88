//! # Ledger Client - Ledger Interaction Workflow
//!
//! **Architecture:** Hexagonal (domain / ports / adapters)
//!
//! ## Purpose
//!
//! Turns two user intents, "run this registered contract with these
//! parameters" and "prove this asset's integrity", into a correctly scoped
//! session against a remote tamper-evident ledger, and renders the result.
//! Contract semantics, the validation algorithm, and the ledger's persistent
//! state all live in the remote service.
//!
//! ## Flow
//!
//! ```text
//! caller ──name/params──→ config ──holder id──→ identifier derivation
//!                                                    │
//!                                                    ↓
//!                          SessionManager::with_config (open)
//!                                                    │
//!                          LedgerSession::dispatch(OperationRequest)
//!                                                    │
//!                                classify ──→ presentation / diagnostics
//!                                                    │
//!                                            session released
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Identifiers always derived from the holder id | `domain/identifiers.rs` |
//! | Absent parameters sent as `{}` | `domain/entities.rs` - `OperationRequest::contract_invocation()` |
//! | Results rendered before the session is released | `service.rs` - `run_contract()`, `run_validation()` |
//! | One session per invocation, released exactly once | `session.rs` - `LedgerSession` |
//! | Non-OK validation is a failure (fail-closed) | `service.rs` - `report_validation()`, `OperationOutcome::is_success()` |
//! | No retries | `service.rs` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use ledger_client::prelude::*;
//!
//! let mut executor = LedgerExecutor::from_current_dir();
//! executor.execute_contract("transfer", Some(serde_json::json!({ "amount": 10 })));
//! executor.validate_asset("asset-1");
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod presentation;
pub mod service;
pub mod session;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::{
        derive_asset_id, derive_contract_id, empty_parameters, hash_hex, hash_hex_with, AssetId,
        ContractId, ContractResult, HashAlgorithm, IdentityContext, OperationOutcome,
        OperationRequest, StatusCode, ValidationResult,
    };

    // Configuration
    pub use crate::config::{ClientConfig, ConfigLocation, CLIENT_PROPERTIES};

    // Ports
    pub use crate::ports::{LedgerCapability, LedgerConnector};

    // Adapters
    pub use crate::adapters::{InMemoryLedger, JsonRpcConnector, JsonRpcLedgerClient, LedgerStats};

    // Session
    pub use crate::session::{LedgerSession, SessionManager};

    // Workflows
    pub use crate::presentation::Console;
    pub use crate::service::LedgerExecutor;

    // Errors
    pub use crate::errors::{
        ConfigurationError, DigestError, LedgerError, RemoteError, SessionError,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
