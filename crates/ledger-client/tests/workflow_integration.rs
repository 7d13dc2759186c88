//! # Workflow Integration Tests
//!
//! Drives the public executor against a counting fake ledger and checks the
//! observable behavior on both output channels.
//!
//! ## Test Strategy
//!
//! 1. Write `client.properties` into a temp directory
//! 2. Inject a fake connector that counts opens and closes
//! 3. Run a workflow and inspect outcome, channels, and counters

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ledger_client::prelude::*;
use parking_lot::Mutex;
use serde_json::{json, Value};

const HOLDER: &str = "holder-01";

// =============================================================================
// FAKE LEDGER
// =============================================================================

#[derive(Clone, Copy)]
enum Behavior {
    Echo,
    Reject,
    Status(StatusCode),
    Panic,
}

#[derive(Clone)]
struct CountingLedger {
    behavior: Behavior,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    last_contract: Arc<Mutex<Option<(String, Value)>>>,
    last_asset: Arc<Mutex<Option<String>>>,
}

impl CountingLedger {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            last_contract: Arc::new(Mutex::new(None)),
            last_asset: Arc::new(Mutex::new(None)),
        }
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl LedgerConnector for CountingLedger {
    fn connect(&self, _config: &ClientConfig) -> Result<Box<dyn LedgerCapability>, SessionError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

impl LedgerCapability for CountingLedger {
    fn invoke_contract(
        &mut self,
        contract_id: &ContractId,
        parameters: &Value,
    ) -> Result<ContractResult, RemoteError> {
        *self.last_contract.lock() = Some((contract_id.to_string(), parameters.clone()));
        match self.behavior {
            Behavior::Echo => Ok(ContractResult::with_payload(parameters.clone())),
            Behavior::Reject => Err(RemoteError::Rejected {
                code: StatusCode::ContractNotFound.code(),
                message: format!("contract not found: {contract_id}"),
            }),
            Behavior::Panic => panic!("ledger client crashed mid-operation"),
            Behavior::Status(_) => Ok(ContractResult::empty()),
        }
    }

    fn validate(&mut self, asset_id: &AssetId) -> Result<ValidationResult, RemoteError> {
        *self.last_asset.lock() = Some(asset_id.to_string());
        match self.behavior {
            Behavior::Status(code) => Ok(ValidationResult::new(code)),
            Behavior::Reject => Err(RemoteError::Transport("connection reset".to_string())),
            Behavior::Panic => panic!("ledger client crashed mid-operation"),
            Behavior::Echo => Ok(ValidationResult::new(StatusCode::Ok)),
        }
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

type TestExecutor = LedgerExecutor<CountingLedger, Vec<u8>, Vec<u8>>;

fn configured_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join(CLIENT_PROPERTIES),
        format!(
            "# ledger client\nscalar.dl.client.cert_holder_id={HOLDER}\nscalar.dl.client.server.host=localhost\n"
        ),
    )
    .expect("write client.properties");
    dir
}

fn executor(ledger: &CountingLedger, dir: &tempfile::TempDir) -> TestExecutor {
    LedgerExecutor::with_location(
        ledger.clone(),
        ConfigLocation::Dir(dir.path().to_path_buf()),
        Console::new(Vec::new(), Vec::new()),
    )
}

fn output(executor: TestExecutor) -> (String, String) {
    let (out, err) = executor.into_console().into_parts();
    (
        String::from_utf8(out).expect("utf8 stdout"),
        String::from_utf8(err).expect("utf8 stderr"),
    )
}

// =============================================================================
// EXECUTION WORKFLOW
// =============================================================================

#[test]
fn test_execute_contract_renders_echoed_payload() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Echo);
    let mut executor = executor(&ledger, &dir);

    let outcome = executor.execute_contract("transfer", Some(json!({ "amount": 10 })));

    assert!(outcome.is_success());
    let (out, err) = output(executor);
    assert!(out.starts_with("[Return]\n"));
    let rendered: Value = serde_json::from_str(out.trim_start_matches("[Return]\n")).unwrap();
    assert_eq!(rendered, json!({ "amount": 10 }));
    assert!(out.contains("\n  \"amount\": 10\n"));
    assert!(err.is_empty(), "diagnostic channel touched: {err}");

    let (contract_id, parameters) = ledger.last_contract.lock().clone().unwrap();
    assert_eq!(contract_id, format!("transfer_{HOLDER}"));
    assert_eq!(parameters, json!({ "amount": 10 }));
    assert_eq!(ledger.opened(), 1);
    assert_eq!(ledger.closed(), 1);
}

#[test]
fn test_execute_contract_business_failure_is_reported_once() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Reject);
    let mut executor = executor(&ledger, &dir);

    let outcome = executor.execute_contract("missing", None);

    assert!(matches!(
        outcome.failure(),
        Some(LedgerError::Execution { .. })
    ));
    let (out, err) = output(executor);
    assert!(out.is_empty());
    assert_eq!(err.lines().count(), 1);
    assert_eq!(err.trim_end(), "Error during contract execution");

    let (_, parameters) = ledger.last_contract.lock().clone().unwrap();
    assert_eq!(parameters, json!({}));
    assert_eq!(ledger.opened(), ledger.closed());
}

#[test]
fn test_missing_configuration_never_opens_session() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = CountingLedger::new(Behavior::Echo);
    let mut executor = executor(&ledger, &dir);

    let outcome = executor.execute_contract("transfer", None);

    assert!(matches!(
        outcome.failure(),
        Some(LedgerError::Configuration(ConfigurationError::NotFound { .. }))
    ));
    assert_eq!(ledger.opened(), 0);
    let (out, err) = output(executor);
    assert!(out.is_empty());
    assert!(err.contains("configuration file not found"));
}

#[test]
fn test_missing_configuration_fails_validation_too() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = CountingLedger::new(Behavior::Status(StatusCode::Ok));
    let mut executor = executor(&ledger, &dir);

    let outcome = executor.validate_asset("asset-2");

    assert!(outcome.failure().is_some());
    assert_eq!(ledger.opened(), 0);
}

// =============================================================================
// VALIDATION WORKFLOW
// =============================================================================

#[test]
fn test_validate_asset_error_status_is_fail_closed() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Status(StatusCode::RuntimeError));
    let mut executor = executor(&ledger, &dir);

    let outcome = executor.validate_asset("asset-1");

    assert!(!outcome.is_success());
    let (out, err) = output(executor);
    assert!(!out.contains("untampered"));
    assert!(!err.contains("untampered"));
    assert!(err.contains("asset-1"));
    assert!(err.contains(&StatusCode::RuntimeError.code().to_string()));
    assert_eq!(ledger.closed(), 1);
}

#[test]
fn test_validate_asset_ok_status() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Status(StatusCode::Ok));
    let mut executor = executor(&ledger, &dir);

    let outcome = executor.validate_asset("asset-2");

    assert!(outcome.is_success());
    assert_eq!(
        ledger.last_asset.lock().clone(),
        Some(format!("{HOLDER}-asset-2"))
    );
    let (out, err) = output(executor);
    assert_eq!(out, "Asset asset-2 is untampered\n");
    assert!(err.is_empty());
}

#[test]
fn test_validate_asset_transport_failure_is_diagnosed() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Reject);
    let mut executor = executor(&ledger, &dir);

    let outcome = executor.validate_asset("asset-3");

    assert!(matches!(outcome.failure(), Some(LedgerError::Remote(_))));
    let (out, err) = output(executor);
    assert!(out.is_empty());
    assert!(err.contains("connection reset"));
    assert_eq!(ledger.opened(), ledger.closed());
}

// =============================================================================
// SESSION LIFECYCLE
// =============================================================================

#[test]
fn test_session_released_when_operation_panics() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Panic);
    let mut executor = executor(&ledger, &dir);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        executor.execute_contract("transfer", None)
    }));

    assert!(result.is_err());
    assert_eq!(ledger.opened(), 1);
    assert_eq!(ledger.closed(), 1);
}

#[test]
fn test_each_invocation_opens_its_own_session() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Echo);
    let mut executor = executor(&ledger, &dir);

    executor.execute_contract("a", None);
    executor.execute_contract("b", Some(json!({ "x": 1 })));
    executor.validate_asset("c");

    assert_eq!(ledger.opened(), 3);
    assert_eq!(ledger.closed(), 3);
}

#[test]
fn test_holder_change_between_invocations_is_picked_up() {
    let dir = configured_dir();
    let ledger = CountingLedger::new(Behavior::Echo);
    let mut executor = executor(&ledger, &dir);

    executor.execute_contract("transfer", None);
    std::fs::write(
        dir.path().join(CLIENT_PROPERTIES),
        "scalar.dl.client.cert_holder_id=holder-02\n",
    )
    .unwrap();
    executor.execute_contract("transfer", None);

    let (contract_id, _) = ledger.last_contract.lock().clone().unwrap();
    assert_eq!(contract_id, "transfer_holder-02");
}

#[test]
fn test_in_memory_ledger_end_to_end() {
    let dir = configured_dir();
    let ledger = InMemoryLedger::new();
    ledger.register_contract(format!("balance_{HOLDER}"), |_| {
        Ok(Some(json!({ "balance": 250 })))
    });
    ledger.set_asset_status(format!("{HOLDER}-asset-9"), ValidationResult::new(StatusCode::Ok));

    let mut executor = LedgerExecutor::with_location(
        ledger.clone(),
        ConfigLocation::Dir(dir.path().to_path_buf()),
        Console::new(Vec::new(), Vec::new()),
    );

    assert!(executor.execute_contract("balance", None).is_success());
    assert!(executor.validate_asset("asset-9").is_success());

    let stats = ledger.stats();
    assert_eq!(stats.opened, 2);
    assert_eq!(stats.closed, 2);
    assert_eq!(stats.dispatched, 2);

    let (out, err) = executor.into_console().into_parts();
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("\"balance\": 250"));
    assert!(out.ends_with("Asset asset-9 is untampered\n"));
    assert!(err.is_empty());
}
