//! JSON-RPC ledger client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::rpc_types::*;
use crate::config::ClientConfig;
use crate::domain::entities::{ContractResult, ValidationResult};
use crate::domain::identifiers::{AssetId, ContractId};
use crate::errors::{RemoteError, SessionError};
use crate::ports::outbound::{LedgerCapability, LedgerConnector};

/// Ledger client speaking JSON-RPC 2.0 to a ledger server.
pub struct JsonRpcLedgerClient {
    client: Option<Client>,
    endpoint: String,
    cert_holder_id: String,
    cert_version: u32,
    request_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    /// Build a client for the server named in `config`.
    ///
    /// No request deadline is set; calls return or fail within the bounds of
    /// the server and the transport.
    pub fn new(config: &ClientConfig) -> Result<Self, SessionError> {
        let endpoint = config.endpoint();
        let connect_error = |source: RemoteError| SessionError::Connect {
            endpoint: endpoint.clone(),
            source,
        };

        let mut headers = HeaderMap::new();
        if let Some(credential) = &config.authorization_credential {
            let value = HeaderValue::from_str(credential).map_err(|e| {
                connect_error(RemoteError::Transport(format!(
                    "invalid authorization credential: {e}"
                )))
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(None::<Duration>)
            .default_headers(headers)
            .build()
            .map_err(|e| connect_error(RemoteError::Transport(e.to_string())))?;

        Ok(Self {
            client: Some(client),
            endpoint,
            cert_holder_id: config.cert_holder_id.clone(),
            cert_version: config.cert_version,
            request_id: AtomicU64::new(1),
        })
    }

    /// The server URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the next request ID.
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method.
    fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<R, RemoteError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RemoteError::Transport("ledger client is closed".to_string()))?;
        let request = JsonRpcRequest::new(method, params, self.next_id());
        debug!(method, id = request.id, endpoint = %self.endpoint, "dispatching ledger request");

        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RemoteError::Transport(format!("cannot connect to {}", self.endpoint))
                } else {
                    RemoteError::Transport(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .map_err(|e| RemoteError::Protocol(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RemoteError::Rejected {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| RemoteError::Protocol("missing result in response".to_string()))
    }
}

impl LedgerCapability for JsonRpcLedgerClient {
    fn invoke_contract(
        &mut self,
        contract_id: &ContractId,
        parameters: &Value,
    ) -> Result<ContractResult, RemoteError> {
        self.call(
            methods::EXECUTE_CONTRACT,
            ExecuteContractParams {
                contract_id,
                contract_argument: parameters,
                cert_holder_id: &self.cert_holder_id,
                cert_version: self.cert_version,
            },
        )
    }

    fn validate(&mut self, asset_id: &AssetId) -> Result<ValidationResult, RemoteError> {
        self.call(
            methods::VALIDATE_LEDGER,
            ValidateLedgerParams {
                asset_id,
                cert_holder_id: &self.cert_holder_id,
                cert_version: self.cert_version,
            },
        )
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        // Dropping the client releases its pooled connections.
        self.client
            .take()
            .map(drop)
            .ok_or_else(|| RemoteError::Transport("ledger client already closed".to_string()))
    }
}

/// Connector producing [`JsonRpcLedgerClient`] handles.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRpcConnector;

impl LedgerConnector for JsonRpcConnector {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn LedgerCapability>, SessionError> {
        Ok(Box::new(JsonRpcLedgerClient::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_targets_configured_endpoint() {
        let mut config = ClientConfig::for_holder("alice");
        config.server_host = "ledger.local".to_string();
        config.server_port = 8080;

        let client = JsonRpcLedgerClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://ledger.local:8080");
        assert_eq!(client.next_id(), 1);
        assert_eq!(client.next_id(), 2);
    }

    #[test]
    fn test_rejects_unencodable_credential() {
        let mut config = ClientConfig::for_holder("alice");
        config.authorization_credential = Some("bad\ncredential".to_string());

        let err = JsonRpcConnector.connect(&config).err().unwrap();
        assert!(matches!(err, SessionError::Connect { .. }));
    }

    #[test]
    fn test_close_twice_fails() {
        let config = ClientConfig::for_holder("alice");
        let mut client = JsonRpcLedgerClient::new(&config).unwrap();
        assert!(client.close().is_ok());
        assert!(client.close().is_err());
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        let mut config = ClientConfig::for_holder("alice");
        config.server_host = "127.0.0.1".to_string();
        config.server_port = 9;

        let mut client = JsonRpcLedgerClient::new(&config).unwrap();
        let asset_id =
            crate::domain::derive_asset_id("1", &config.identity().unwrap());
        let err = client.validate(&asset_id).unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
    }
}
