//! # In-Memory Ledger
//!
//! A process-local ledger used for dry runs and tests. Every handle it hands
//! out shares one state, so callers can inspect what was opened, dispatched
//! and closed after a workflow returns.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::entities::{ContractResult, OperationRequest, StatusCode, ValidationResult};
use crate::domain::identifiers::{AssetId, ContractId};
use crate::errors::{RemoteError, SessionError};
use crate::ports::outbound::{LedgerCapability, LedgerConnector};

/// Contract logic registered with the in-memory ledger.
pub type ContractHandler = Arc<dyn Fn(&Value) -> Result<Option<Value>, RemoteError> + Send + Sync>;

/// Endpoint reported by in-memory connection failures.
pub const IN_MEMORY_ENDPOINT: &str = "memory://ledger";

#[derive(Default)]
struct LedgerState {
    contracts: HashMap<String, ContractHandler>,
    assets: HashMap<String, ValidationResult>,
    dispatched: Vec<OperationRequest>,
    opened: usize,
    closed: usize,
    connect_failure: Option<String>,
    close_failure: Option<String>,
    dry_run: bool,
}

/// Session counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Handles handed out.
    pub opened: usize,
    /// Handles closed.
    pub closed: usize,
    /// Requests dispatched through any handle.
    pub dispatched: usize,
}

/// Process-local ledger.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// An empty ledger: unknown contracts and assets are rejected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that echoes unknown contracts and passes unknown assets.
    #[must_use]
    pub fn dry_run() -> Self {
        let ledger = Self::new();
        ledger.state.lock().dry_run = true;
        ledger
    }

    /// Register contract logic under a backend contract id.
    pub fn register_contract<F>(&self, contract_id: impl Into<String>, handler: F)
    where
        F: Fn(&Value) -> Result<Option<Value>, RemoteError> + Send + Sync + 'static,
    {
        self.state
            .lock()
            .contracts
            .insert(contract_id.into(), Arc::new(handler));
    }

    /// Register a contract that returns its argument.
    pub fn register_echo_contract(&self, contract_id: impl Into<String>) {
        self.register_contract(contract_id, |argument| Ok(Some(argument.clone())));
    }

    /// Set the validation answer for a backend asset id.
    pub fn set_asset_status(&self, asset_id: impl Into<String>, result: ValidationResult) {
        self.state.lock().assets.insert(asset_id.into(), result);
    }

    /// Make every subsequent connect fail with `reason`.
    pub fn fail_connections(&self, reason: impl Into<String>) {
        self.state.lock().connect_failure = Some(reason.into());
    }

    /// Make every subsequent close fail with `reason`.
    pub fn fail_close(&self, reason: impl Into<String>) {
        self.state.lock().close_failure = Some(reason.into());
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        let state = self.state.lock();
        LedgerStats {
            opened: state.opened,
            closed: state.closed,
            dispatched: state.dispatched.len(),
        }
    }

    /// Every request dispatched so far, in order.
    #[must_use]
    pub fn dispatched(&self) -> Vec<OperationRequest> {
        self.state.lock().dispatched.clone()
    }
}

impl LedgerConnector for InMemoryLedger {
    fn connect(&self, _config: &ClientConfig) -> Result<Box<dyn LedgerCapability>, SessionError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.connect_failure {
            return Err(SessionError::Connect {
                endpoint: IN_MEMORY_ENDPOINT.to_string(),
                source: RemoteError::Transport(reason.clone()),
            });
        }
        state.opened += 1;
        debug!(opened = state.opened, "in-memory ledger handle opened");
        Ok(Box::new(InMemoryHandle {
            state: Arc::clone(&self.state),
        }))
    }
}

struct InMemoryHandle {
    state: Arc<Mutex<LedgerState>>,
}

impl LedgerCapability for InMemoryHandle {
    fn invoke_contract(
        &mut self,
        contract_id: &ContractId,
        parameters: &Value,
    ) -> Result<ContractResult, RemoteError> {
        let (handler, dry_run) = {
            let mut state = self.state.lock();
            state.dispatched.push(OperationRequest::ContractInvocation {
                contract_id: contract_id.clone(),
                parameters: parameters.clone(),
            });
            (state.contracts.get(contract_id.as_str()).cloned(), state.dry_run)
        };

        // Handlers run without the state lock held.
        match handler {
            Some(handler) => handler(parameters).map(|result| ContractResult { result }),
            None if dry_run => Ok(ContractResult::with_payload(parameters.clone())),
            None => Err(RemoteError::Rejected {
                code: StatusCode::ContractNotFound.code(),
                message: format!("contract not found: {contract_id}"),
            }),
        }
    }

    fn validate(&mut self, asset_id: &AssetId) -> Result<ValidationResult, RemoteError> {
        let mut state = self.state.lock();
        state
            .dispatched
            .push(OperationRequest::ValidationRequest {
                asset_id: asset_id.clone(),
            });

        match state.assets.get(asset_id.as_str()) {
            Some(result) => Ok(result.clone()),
            None if state.dry_run => {
                Ok(ValidationResult::new(StatusCode::Ok).with_detail("dry run"))
            }
            None => Err(RemoteError::Rejected {
                code: StatusCode::InvalidRequest.code(),
                message: format!("asset not found: {asset_id}"),
            }),
        }
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        state.closed += 1;
        debug!(closed = state.closed, "in-memory ledger handle closed");
        match &state.close_failure {
            Some(reason) => Err(RemoteError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{derive_asset_id, derive_contract_id, IdentityContext};
    use serde_json::json;

    fn alice() -> IdentityContext {
        IdentityContext::new("alice").unwrap()
    }

    #[test]
    fn test_registered_contract_runs() {
        let ledger = InMemoryLedger::new();
        ledger.register_echo_contract("transfer_alice");

        let mut handle = ledger.connect(&ClientConfig::for_holder("alice")).unwrap();
        let result = handle
            .invoke_contract(&derive_contract_id("transfer", &alice()), &json!({ "amount": 10 }))
            .unwrap();

        assert_eq!(result.result, Some(json!({ "amount": 10 })));
        assert_eq!(
            ledger.stats(),
            LedgerStats {
                opened: 1,
                closed: 0,
                dispatched: 1
            }
        );
    }

    #[test]
    fn test_unknown_contract_rejected() {
        let ledger = InMemoryLedger::new();
        let mut handle = ledger.connect(&ClientConfig::for_holder("alice")).unwrap();
        let err = handle
            .invoke_contract(&derive_contract_id("missing", &alice()), &json!({}))
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { code: 404, .. }));
    }

    #[test]
    fn test_dry_run_defaults() {
        let ledger = InMemoryLedger::dry_run();
        let mut handle = ledger.connect(&ClientConfig::for_holder("alice")).unwrap();

        let result = handle
            .invoke_contract(&derive_contract_id("any", &alice()), &json!({ "k": "v" }))
            .unwrap();
        assert_eq!(result.result, Some(json!({ "k": "v" })));

        let validation = handle.validate(&derive_asset_id("x", &alice())).unwrap();
        assert!(validation.is_untampered());
    }

    #[test]
    fn test_connect_failure() {
        let ledger = InMemoryLedger::new();
        ledger.fail_connections("connection refused");
        assert!(ledger.connect(&ClientConfig::for_holder("alice")).is_err());
        assert_eq!(ledger.stats().opened, 0);
    }

    #[test]
    fn test_close_is_counted_even_when_failing() {
        let ledger = InMemoryLedger::new();
        ledger.fail_close("socket reset");
        let mut handle = ledger.connect(&ClientConfig::for_holder("alice")).unwrap();
        assert!(handle.close().is_err());
        assert_eq!(ledger.stats().closed, 1);
    }
}
