//! # Driven Ports (SPI - Outbound)
//!
//! The ledger service is an opaque capability consumed over a service
//! boundary. Adapters implement these traits to provide:
//! - Contract invocation
//! - Ledger validation
//! - An open/close lifecycle for the client handle
//!
//! Both calls are synchronous and return-or-fail.

use crate::config::ClientConfig;
use crate::domain::entities::{ContractResult, ValidationResult};
use crate::domain::identifiers::{AssetId, ContractId};
use crate::errors::{RemoteError, SessionError};
use serde_json::Value;

// =============================================================================
// LEDGER CAPABILITY
// =============================================================================

/// A live handle to the remote ledger.
///
/// A handle is owned by exactly one session and is closed exactly once by
/// that session.
pub trait LedgerCapability: Send {
    /// Execute a registered contract.
    ///
    /// # Arguments
    ///
    /// * `contract_id` - Derived contract identifier
    /// * `parameters` - Contract argument, `{}` when the caller gave none
    fn invoke_contract(
        &mut self,
        contract_id: &ContractId,
        parameters: &Value,
    ) -> Result<ContractResult, RemoteError>;

    /// Ask the ledger whether an asset's history is untampered.
    ///
    /// A non-OK status is an answer, not an error.
    fn validate(&mut self, asset_id: &AssetId) -> Result<ValidationResult, RemoteError>;

    /// Release the handle.
    fn close(&mut self) -> Result<(), RemoteError>;
}

// =============================================================================
// LEDGER CONNECTOR
// =============================================================================

/// Constructs ledger handles from configuration.
///
/// This is the injection point for the remote client: the session manager
/// never names a concrete adapter.
pub trait LedgerConnector {
    /// Open a new handle. Failing here means no session is ever opened.
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn LedgerCapability>, SessionError>;
}

impl<F> LedgerConnector for F
where
    F: Fn(&ClientConfig) -> Result<Box<dyn LedgerCapability>, SessionError>,
{
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn LedgerCapability>, SessionError> {
        self(config)
    }
}

// =============================================================================
// TESTS
// =============================================================================
