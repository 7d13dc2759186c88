//! # Domain Entities
//!
//! Requests sent through a ledger session and the outcomes classified from
//! the answers.

use super::identifiers::{AssetId, ContractId};
use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// REQUESTS
// =============================================================================

/// A request dispatched through a ledger session.
///
/// Identifiers are always derived, never taken from the caller verbatim.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationRequest {
    /// Run a registered contract.
    ContractInvocation {
        contract_id: ContractId,
        parameters: Value,
    },
    /// Prove an asset's history is untampered.
    ValidationRequest { asset_id: AssetId },
}

impl OperationRequest {
    /// Build a contract invocation, substituting `{}` for absent parameters.
    #[must_use]
    pub fn contract_invocation(contract_id: ContractId, parameters: Option<Value>) -> Self {
        Self::ContractInvocation {
            contract_id,
            parameters: parameters.unwrap_or_else(empty_parameters),
        }
    }

    /// Build a validation request.
    #[must_use]
    pub fn validation(asset_id: AssetId) -> Self {
        Self::ValidationRequest { asset_id }
    }
}

/// The payload sent when the caller supplies no parameters.
#[must_use]
pub fn empty_parameters() -> Value {
    Value::Object(serde_json::Map::new())
}

// =============================================================================
// RESULTS
// =============================================================================

/// Result of a successful contract execution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractResult {
    /// The contract's return value, absent when it returned nothing.
    #[serde(default)]
    pub result: Option<Value>,
}

impl ContractResult {
    /// A result carrying `payload`.
    #[must_use]
    pub fn with_payload(payload: Value) -> Self {
        Self {
            result: Some(payload),
        }
    }

    /// A result with an explicit absence marker.
    #[must_use]
    pub fn empty() -> Self {
        Self { result: None }
    }
}

/// Ledger status codes returned by validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Validation passed.
    Ok,
    InvalidHash,
    InvalidPrevHash,
    InvalidContract,
    InvalidOutput,
    InvalidNonce,
    InconsistentStates,
    InvalidSignature,
    UnloadableKey,
    UnloadableContract,
    CertificateNotFound,
    ContractNotFound,
    CertificateAlreadyRegistered,
    InvalidRequest,
    DatabaseError,
    UnknownTransactionStatus,
    /// Generic failure inside the ledger.
    RuntimeError,
    ContractContextualError,
    /// A code this client does not know by name.
    Unknown(i32),
}

impl StatusCode {
    const KNOWN: [(Self, i32, &'static str); 18] = [
        (Self::Ok, 200, "OK"),
        (Self::InvalidHash, 300, "INVALID_HASH"),
        (Self::InvalidPrevHash, 301, "INVALID_PREV_HASH"),
        (Self::InvalidContract, 302, "INVALID_CONTRACT"),
        (Self::InvalidOutput, 303, "INVALID_OUTPUT"),
        (Self::InvalidNonce, 304, "INVALID_NONCE"),
        (Self::InconsistentStates, 305, "INCONSISTENT_STATES"),
        (Self::InvalidSignature, 400, "INVALID_SIGNATURE"),
        (Self::UnloadableKey, 401, "UNLOADABLE_KEY"),
        (Self::UnloadableContract, 402, "UNLOADABLE_CONTRACT"),
        (Self::CertificateNotFound, 403, "CERTIFICATE_NOT_FOUND"),
        (Self::ContractNotFound, 404, "CONTRACT_NOT_FOUND"),
        (
            Self::CertificateAlreadyRegistered,
            405,
            "CERTIFICATE_ALREADY_REGISTERED",
        ),
        (Self::InvalidRequest, 414, "INVALID_REQUEST"),
        (Self::DatabaseError, 500, "DATABASE_ERROR"),
        (
            Self::UnknownTransactionStatus,
            501,
            "UNKNOWN_TRANSACTION_STATUS",
        ),
        (Self::RuntimeError, 502, "RUNTIME_ERROR"),
        (Self::ContractContextualError, 503, "CONTRACT_CONTEXTUAL_ERROR"),
    ];

    /// Map a raw numeric code.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self::KNOWN
            .iter()
            .find(|(_, known, _)| *known == code)
            .map_or(Self::Unknown(code), |(status, _, _)| *status)
    }

    /// Resolve a status by name. `ERROR` is an alias for `RUNTIME_ERROR`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_uppercase();
        if name == "ERROR" {
            return Some(Self::RuntimeError);
        }
        Self::KNOWN
            .iter()
            .find(|(_, _, known)| *known == name)
            .map(|(status, _, _)| *status)
    }

    /// The raw numeric code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown(code) => code,
            known => Self::KNOWN
                .iter()
                .find(|(status, _, _)| *status == known)
                .map_or(0, |(_, code, _)| *code),
        }
    }

    /// The symbolic name.
    #[must_use]
    pub fn name(self) -> &'static str {
        Self::KNOWN
            .iter()
            .find(|(status, _, _)| *status == self)
            .map_or("UNKNOWN", |(_, _, name)| name)
    }

    /// Returns true only for `OK`.
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

impl Serialize for StatusCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from_code)
    }
}

/// Result of a validation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Status reported by the ledger.
    pub code: StatusCode,
    /// Optional human-readable detail.
    #[serde(default)]
    pub detail: Option<String>,
}

impl ValidationResult {
    /// A result with no detail.
    #[must_use]
    pub fn new(code: StatusCode) -> Self {
        Self { code, detail: None }
    }

    /// Attach a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Fail-closed: anything but `OK` is not proven untampered.
    #[must_use]
    pub fn is_untampered(&self) -> bool {
        self.code.is_ok()
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// What a workflow ended with, after reporting.
#[derive(Debug)]
pub enum OperationOutcome {
    /// The contract ran; payload was rendered if present.
    ContractResult { payload: Option<Value> },
    /// The ledger answered a validation request.
    ValidationResult {
        status_code: StatusCode,
        detail: Option<String>,
    },
    /// The invocation failed and was reported.
    Failure { cause: LedgerError },
}

impl OperationOutcome {
    /// Returns true for a contract result or an `OK` validation.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::ContractResult { .. } => true,
            Self::ValidationResult { status_code, .. } => status_code.is_ok(),
            Self::Failure { .. } => false,
        }
    }

    /// The failure cause, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&LedgerError> {
        match self {
            Self::Failure { cause } => Some(cause),
            _ => None,
        }
    }
}

impl From<ContractResult> for OperationOutcome {
    fn from(result: ContractResult) -> Self {
        Self::ContractResult {
            payload: result.result,
        }
    }
}

impl From<ValidationResult> for OperationOutcome {
    fn from(result: ValidationResult) -> Self {
        Self::ValidationResult {
            status_code: result.code,
            detail: result.detail,
        }
    }
}

impl From<LedgerError> for OperationOutcome {
    fn from(cause: LedgerError) -> Self {
        Self::Failure { cause }
    }
}

// =============================================================================
// TESTS
// =============================================================================
