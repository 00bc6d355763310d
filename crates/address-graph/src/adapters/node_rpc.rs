//! JSON-RPC 1.0 client for the full node.

use crate::config::NodeRpcConfig;
use crate::domain::TransportError;
use crate::ports::{AddressValidation, NodeRpc, RawTransaction};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Authenticated node client.
pub struct JsonRpcNode {
    client: Client,
    url: String,
    username: String,
    password: String,
    request_id: AtomicU64,
}

impl JsonRpcNode {
    /// Build a client for `config`.
    pub fn new(config: &NodeRpcConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    fn request<'a, P: Serialize>(&self, method: &'a str, params: P) -> JsonRpcRequest<'a, P> {
        JsonRpcRequest {
            jsonrpc: "1.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        }
    }

    /// Make a JSON-RPC call.
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, TransportError> {
        let request = self.request(method, params);
        debug!(method, id = request.id, "JSON-RPC call");

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        // The node reports RPC errors with a 4xx/5xx status and a JSON body;
        // only authentication failures come without one.
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await?;
        let decoded: JsonRpcResponse<R> = serde_json::from_slice(&body).map_err(|e| {
            if status.is_success() {
                TransportError::from(e)
            } else {
                TransportError::Status {
                    status: status.as_u16(),
                    url: self.url.clone(),
                }
            }
        })?;

        decode_response(decoded)
    }
}

fn decode_response<R>(response: JsonRpcResponse<R>) -> Result<R, TransportError> {
    if let Some(error) = response.error {
        return Err(TransportError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| TransportError::Decode("RPC response missing result".to_string()))
}

#[async_trait]
impl NodeRpc for JsonRpcNode {
    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransaction, TransportError> {
        self.call("getrawtransaction", json!([txid, 1])).await
    }

    async fn validate_address(&self, address: &str) -> Result<AddressValidation, TransportError> {
        self.call("validateaddress", json!([address])).await
    }
}
