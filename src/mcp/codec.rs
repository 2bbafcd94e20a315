//! JSON-RPC 2.0 envelope representations and the wire codec
//!
//! Decoding stops at the envelope: `method` and `params` are carried through untouched for
//! the dispatcher and the application handler to interpret.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation token copied from a request onto its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(Number),
    String(String),
}

/// An inbound call. `"params": null` and `"id": null` decode the same as absent fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(ErrorDetail),
}

/// A response carries exactly one of `result` or `error`; `id` is `null` when unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub id: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("body is not well-formed JSON")]
    Parse,
    #[error("body is not a JSON-RPC request object")]
    InvalidRequest { id: Option<RequestId> },
}

impl JsonRpcRequest {
    /// Builds a request tagged with the supported protocol version.
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    pub fn has_supported_version(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION
    }
}

impl JsonRpcResponse {
    pub fn result(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            outcome: Outcome::Result(result),
            id,
        }
    }

    pub fn error(id: Option<RequestId>, error: ErrorDetail) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            outcome: Outcome::Error(error),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

/// Numeric ids, as most clients send them.
impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// String ids.
impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

pub fn decode(bytes: &[u8]) -> Result<JsonRpcRequest, DecodeError> {
    let payload: Value = serde_json::from_slice(bytes).map_err(|_| DecodeError::Parse)?;
    let id = recover_id(&payload);

    serde_json::from_value(payload).map_err(|_| DecodeError::InvalidRequest { id })
}

pub fn encode(response: &JsonRpcResponse) -> Vec<u8> {
    serde_json::to_vec(response).expect("jsonrpc response serialization")
}

fn recover_id(payload: &Value) -> Option<RequestId> {
    payload
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok())
}
