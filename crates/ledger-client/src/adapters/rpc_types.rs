//! JSON-RPC envelopes and ledger method payloads.

use crate::domain::identifiers::{AssetId, ContractId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ledger JSON-RPC method names.
pub mod methods {
    pub const EXECUTE_CONTRACT: &str = "ledger_executeContract";
    pub const VALIDATE_LEDGER: &str = "ledger_validateLedger";
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: &'static str, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id,
        }
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// Params of `ledger_executeContract`.
#[derive(Debug, Serialize)]
pub struct ExecuteContractParams<'a> {
    pub contract_id: &'a ContractId,
    pub contract_argument: &'a Value,
    pub cert_holder_id: &'a str,
    pub cert_version: u32,
}

/// Params of `ledger_validateLedger`.
#[derive(Debug, Serialize)]
pub struct ValidateLedgerParams<'a> {
    pub asset_id: &'a AssetId,
    pub cert_holder_id: &'a str,
    pub cert_version: u32,
}
