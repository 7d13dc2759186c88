//! # Error Types
//!
//! All error types for the ledger interaction workflow.
//!
//! | Error | Raised by | Policy |
//! |-------|-----------|--------|
//! | `ConfigurationError` | `config` | Fatal, full diagnostic report |
//! | `SessionError` | `session`, connectors | Fatal, full diagnostic report |
//! | `RemoteError` | `LedgerCapability` adapters | Classified by the workflow |
//! | `DigestError` | `domain::digest` | Reported, no usable result |

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Errors raised while loading `client.properties`.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No configuration file at the expected location.
    #[error("configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("configuration file unreadable: {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required key is absent or empty.
    #[error("missing required configuration key: {0}")]
    MissingKey(&'static str),

    /// A key is present but its value cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// The working directory could not be resolved.
    #[error("cannot resolve working directory")]
    WorkingDirectory(#[source] std::io::Error),
}

// =============================================================================
// SESSION ERRORS
// =============================================================================

/// Errors from opening or releasing a ledger session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The ledger client could not be constructed.
    #[error("cannot connect to ledger at {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: RemoteError,
    },

    /// Releasing the session failed on an otherwise successful path.
    #[error("failed to close ledger session")]
    Close(#[source] RemoteError),
}

// =============================================================================
// REMOTE ERRORS
// =============================================================================

/// Failures reported by the remote ledger capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The ledger answered and refused the request.
    #[error("ledger rejected request ({code}): {message}")]
    Rejected { code: i32, message: String },

    /// The request never got an answer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The answer could not be decoded.
    #[error("malformed ledger response: {0}")]
    Protocol(String),
}

// =============================================================================
// DIGEST ERRORS
// =============================================================================

/// Errors from the digest utility.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The requested hash algorithm is not available.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

// =============================================================================
// WORKFLOW ERRORS
// =============================================================================

/// Umbrella error classified at each workflow boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The session could not be opened or closed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The ledger rejected or failed to execute the contract.
    #[error("contract execution failed: {contract_id}")]
    Execution {
        contract_id: String,
        #[source]
        source: RemoteError,
    },

    /// A non-execution call to the ledger failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl LedgerError {
    /// Returns true if this error ends the invocation with a full diagnostic.
    ///
    /// Business failures are reported tersely instead.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Execution { .. })
    }

    /// Every message in the error chain, outermost first.
    #[must_use]
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        messages
    }
}

// =============================================================================
// TESTS
// =============================================================================
