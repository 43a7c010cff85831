use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LocatorError, LocatorResult};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9008";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// JSON-RPC 2.0 request body.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 response body.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Unwrap the result, turning an error object into [`LocatorError::DeviceRpc`].
    pub fn into_result(self, method: &str) -> LocatorResult<Value> {
        if let Some(err) = self.error {
            return Err(LocatorError::DeviceRpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// Something that can carry one RPC call to the device and back.
pub trait RpcTransport {
    fn call(&self, method: &str, params: Value) -> LocatorResult<Value>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for &T {
    fn call(&self, method: &str, params: Value) -> LocatorResult<Value> {
        (**self).call(method, params)
    }
}

/// Talks to the uiautomator server forwarded from the device (`adb forward tcp:9008 tcp:9008`).
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> LocatorResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocatorError::DeviceTransport {
                method: "connect".into(),
                source: e,
            })?;
        Ok(Self {
            client,
            url: rpc_url(endpoint),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RpcTransport for HttpTransport {
    fn call(&self, method: &str, params: Value) -> LocatorResult<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::trace!(method, id = request.id, "device rpc");

        let transport_err = |e| LocatorError::DeviceTransport {
            method: method.to_string(),
            source: e,
        };

        let body = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(transport_err)?
            .text()
            .map_err(transport_err)?;

        let response: RpcResponse =
            serde_json::from_str(&body).map_err(|e| LocatorError::JsonParse {
                context: format!("{} response", method),
                source: e,
            })?;

        response.into_result(method)
    }
}

fn rpc_url(endpoint: &str) -> String {
    format!("{}/jsonrpc/0", endpoint.trim_end_matches('/'))
}
