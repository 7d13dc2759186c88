//! # Ledger Session Manager
//!
//! Acquires one ledger handle per operation and guarantees it is released
//! exactly once on every exit path: normal return, a failure returned by the
//! operation, or an unwinding panic.
//!
//! ## Release Policy
//!
//! | Operation result | Close result | Returned |
//! |------------------|--------------|----------|
//! | `Ok(v)` | `Ok` | `Ok(v)` |
//! | `Ok(v)` | `Err(c)` | `Err(SessionError::Close(c))` |
//! | `Err(e)` | any | `Err(e)` (close failure logged, never masks `e`) |
//! | panic | any | panic resumes after release |

use tracing::{debug, warn};

use crate::config::{ClientConfig, ConfigLocation};
use crate::domain::entities::{ContractResult, OperationOutcome, OperationRequest, ValidationResult};
use crate::domain::identifiers::{AssetId, ContractId};
use crate::domain::identity::IdentityContext;
use crate::errors::{ConfigurationError, LedgerError, RemoteError, SessionError};
use crate::ports::outbound::{LedgerCapability, LedgerConnector};
use serde_json::Value;

// =============================================================================
// SESSION
// =============================================================================

/// One open handle to the ledger, owned by the workflow that opened it.
pub struct LedgerSession {
    handle: Option<Box<dyn LedgerCapability>>,
    identity: IdentityContext,
}

impl LedgerSession {
    fn open(
        connector: &dyn LedgerConnector,
        config: &ClientConfig,
        identity: IdentityContext,
    ) -> Result<Self, SessionError> {
        let handle = connector.connect(config)?;
        debug!(holder = %identity, "ledger session opened");
        Ok(Self {
            handle: Some(handle),
            identity,
        })
    }

    /// The identity this session was opened for.
    #[must_use]
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// Execute a contract through this session.
    pub fn invoke_contract(
        &mut self,
        contract_id: &ContractId,
        parameters: &Value,
    ) -> Result<ContractResult, RemoteError> {
        debug!(%contract_id, "dispatching contract invocation");
        self.handle_mut()?.invoke_contract(contract_id, parameters)
    }

    /// Validate an asset through this session.
    pub fn validate(&mut self, asset_id: &AssetId) -> Result<ValidationResult, RemoteError> {
        debug!(%asset_id, "dispatching validation request");
        self.handle_mut()?.validate(asset_id)
    }

    /// Dispatch one request and lift the answer into an outcome.
    ///
    /// A non-OK validation status is an outcome, not an error.
    pub fn dispatch(&mut self, request: &OperationRequest) -> Result<OperationOutcome, RemoteError> {
        match request {
            OperationRequest::ContractInvocation {
                contract_id,
                parameters,
            } => self.invoke_contract(contract_id, parameters).map(Into::into),
            OperationRequest::ValidationRequest { asset_id } => {
                self.validate(asset_id).map(Into::into)
            }
        }
    }

    /// Release the session, surfacing a close failure.
    pub fn close(mut self) -> Result<(), SessionError> {
        self.release().map_err(SessionError::Close)
    }

    fn handle_mut(&mut self) -> Result<&mut Box<dyn LedgerCapability>, RemoteError> {
        self.handle
            .as_mut()
            .ok_or_else(|| RemoteError::Transport("ledger session already closed".to_string()))
    }

    /// Close the handle if still held. Subsequent calls are no-ops.
    fn release(&mut self) -> Result<(), RemoteError> {
        match self.handle.take() {
            Some(mut handle) => {
                debug!(holder = %self.identity, "ledger session closed");
                handle.close()
            }
            None => Ok(()),
        }
    }
}

impl Drop for LedgerSession {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to close ledger session during unwind");
        }
    }
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Opens scoped ledger sessions from configuration and an injected connector.
pub struct SessionManager<C> {
    connector: C,
    location: ConfigLocation,
}

impl<C: LedgerConnector> SessionManager<C> {
    /// Sessions configured from `client.properties` in the working directory.
    pub fn new(connector: C) -> Self {
        Self::with_location(connector, ConfigLocation::CurrentDir)
    }

    /// Sessions configured from an explicit location.
    pub fn with_location(connector: C, location: ConfigLocation) -> Self {
        Self {
            connector,
            location,
        }
    }

    /// The injected connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Load configuration fresh from the configured location.
    pub fn load_config(&self) -> Result<ClientConfig, ConfigurationError> {
        self.location.load()
    }

    /// Load configuration, open a session, run `f`, and release the session.
    pub fn with_session<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerSession) -> Result<T, LedgerError>,
    {
        let config = self.load_config()?;
        self.with_config(&config, f)
    }

    /// Open a session from an already loaded configuration, run `f`, and
    /// release the session.
    ///
    /// A connect failure returns before `f` is invoked.
    pub fn with_config<T, F>(&self, config: &ClientConfig, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerSession) -> Result<T, LedgerError>,
    {
        let identity = config.identity()?;
        let mut session = LedgerSession::open(&self.connector, config, identity)?;

        match f(&mut session) {
            Ok(value) => {
                session.close()?;
                Ok(value)
            }
            Err(primary) => {
                if let Err(close) = session.close() {
                    warn!(
                        error = %primary,
                        close_error = %close,
                        "ignoring session close failure after operation failure"
                    );
                }
                Err(primary)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
