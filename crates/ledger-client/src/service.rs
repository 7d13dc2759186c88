//! # Ledger Executor
//!
//! The two public workflows: run a registered contract, and prove an asset
//! is untampered. Each call reloads configuration, opens exactly one session,
//! dispatches exactly one request, and reports its outcome at exactly one
//! point. No call is retried and no failure escapes as a panic or `Err`.
//!
//! ## Reporting
//!
//! | Outcome | Channel | Message |
//! |---------|---------|---------|
//! | Contract result | primary | `[Return]` + pretty JSON |
//! | Contract rejected | diagnostic | `Error during contract execution` |
//! | Validation OK | primary | `Asset <id> is untampered` |
//! | Validation not OK | diagnostic | `Error during asset validate: ...` |
//! | Configuration / session failure | diagnostic | full error chain |

use std::io::{Stderr, Stdout, Write};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::adapters::JsonRpcConnector;
use crate::config::ConfigLocation;
use crate::domain::entities::{OperationOutcome, OperationRequest, StatusCode};
use crate::domain::identifiers::{derive_asset_id, derive_contract_id};
use crate::errors::LedgerError;
use crate::ports::outbound::LedgerConnector;
use crate::presentation::Console;
use crate::session::SessionManager;

/// Terse message for a contract the ledger rejected or failed to execute.
pub const EXECUTION_ERROR_MESSAGE: &str = "Error during contract execution";

/// Prefix of the message for an asset that failed validation.
pub const VALIDATION_ERROR_MESSAGE: &str = "Error during asset validate";

/// Runs ledger workflows and reports their outcomes.
pub struct LedgerExecutor<C, O, E> {
    sessions: SessionManager<C>,
    console: Console<O, E>,
}

impl LedgerExecutor<JsonRpcConnector, Stdout, Stderr> {
    /// JSON-RPC client, `client.properties` in the working directory, stdio.
    #[must_use]
    pub fn from_current_dir() -> Self {
        Self::new(SessionManager::new(JsonRpcConnector), Console::stdio())
    }
}

impl<C, O, E> LedgerExecutor<C, O, E>
where
    C: LedgerConnector,
    O: Write,
    E: Write,
{
    /// Build an executor from its parts.
    pub fn new(sessions: SessionManager<C>, console: Console<O, E>) -> Self {
        Self { sessions, console }
    }

    /// Build an executor reading configuration from `location`.
    pub fn with_location(connector: C, location: ConfigLocation, console: Console<O, E>) -> Self {
        Self::new(SessionManager::with_location(connector, location), console)
    }

    /// The session manager.
    pub fn sessions(&self) -> &SessionManager<C> {
        &self.sessions
    }

    /// The output channels.
    pub fn console(&self) -> &Console<O, E> {
        &self.console
    }

    /// Release the output channels.
    pub fn into_console(self) -> Console<O, E> {
        self.console
    }

    // =========================================================================
    // EXECUTION WORKFLOW
    // =========================================================================

    /// Execute the contract `contract_name` registered by the configured holder.
    ///
    /// Absent `parameters` are sent as `{}`. The result is rendered while the
    /// session is still open.
    #[instrument(skip(self, parameters))]
    pub fn execute_contract(
        &mut self,
        contract_name: &str,
        parameters: Option<Value>,
    ) -> OperationOutcome {
        match self.run_contract(contract_name, parameters) {
            Ok(outcome) => outcome,
            Err(err) => self.fail(err),
        }
    }

    fn run_contract(
        &mut self,
        contract_name: &str,
        parameters: Option<Value>,
    ) -> Result<OperationOutcome, LedgerError> {
        let config = self.sessions.load_config()?;
        let identity = config.identity()?;
        let contract_id = derive_contract_id(contract_name, &identity);
        let request = OperationRequest::contract_invocation(contract_id.clone(), parameters);
        let console = &mut self.console;

        self.sessions.with_config(&config, |session| {
            let outcome = session
                .dispatch(&request)
                .map_err(|source| LedgerError::Execution {
                    contract_id: contract_id.to_string(),
                    source,
                })?;
            if let OperationOutcome::ContractResult { payload } = &outcome {
                info!(has_payload = payload.is_some(), "contract executed");
                console.render(payload.as_ref());
            }
            Ok(outcome)
        })
    }

    // =========================================================================
    // VALIDATION WORKFLOW
    // =========================================================================

    /// Ask the ledger whether the holder's asset `id` is untampered.
    ///
    /// Anything but `OK` is reported as a failed validation.
    #[instrument(skip(self))]
    pub fn validate_asset(&mut self, id: &str) -> OperationOutcome {
        match self.run_validation(id) {
            Ok(outcome) => outcome,
            Err(err) => self.fail(err),
        }
    }

    fn run_validation(&mut self, id: &str) -> Result<OperationOutcome, LedgerError> {
        let config = self.sessions.load_config()?;
        let identity = config.identity()?;
        let request = OperationRequest::validation(derive_asset_id(id, &identity));
        let console = &mut self.console;

        self.sessions.with_config(&config, |session| {
            let outcome = session.dispatch(&request)?;
            if let OperationOutcome::ValidationResult {
                status_code,
                detail,
            } = &outcome
            {
                report_validation(console, id, *status_code, detail.as_deref());
            }
            Ok(outcome)
        })
    }

    // =========================================================================
    // FAILURE REPORTING
    // =========================================================================

    fn fail(&mut self, err: LedgerError) -> OperationOutcome {
        if err.is_fatal() {
            debug!(error = %err, "ledger operation failed");
            self.console.diagnose(&err.chain());
        } else {
            warn!(error = %err, "ledger rejected the operation");
            self.console.report(EXECUTION_ERROR_MESSAGE);
        }
        err.into()
    }
}

fn report_validation<O: Write, E: Write>(
    console: &mut Console<O, E>,
    id: &str,
    status_code: StatusCode,
    detail: Option<&str>,
) {
    if status_code.is_ok() {
        info!(asset = id, "asset validated");
        console.say(&format!("Asset {id} is untampered"));
        return;
    }

    warn!(asset = id, status = %status_code, "asset failed validation");
    let mut line = format!("{VALIDATION_ERROR_MESSAGE}: asset {id}, status code: {status_code}");
    if let Some(detail) = detail {
        line.push_str(&format!(", detail: {detail}"));
    }
    console.report(&line);
}
