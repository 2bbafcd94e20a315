//! The handshake dispatcher
//!
//! Enforces `initialize` before any application method, routes everything else to the
//! application [`Handler`], and packages outcomes into JSON-RPC response envelopes.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
    sync::Arc,
};

use async_trait::async_trait;
use rust_mcp_sdk::schema::{Implementation, ProtocolVersion};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{HandlerError, RpcError};
use crate::mcp::audit::redact_audit_params;
use crate::mcp::codec::{decode, DecodeError, JsonRpcRequest, JsonRpcResponse, RequestId};

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2024-11-05";

pub type Capabilities = BTreeMap<String, bool>;

/// Application logic plugged in behind the handshake.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Observes every successful handshake before its result is returned.
    async fn initialize(&self, _params: &InitializeParams) {}

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, HandlerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub server_info: Implementation,
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
}

/// Handshake state shared by every request served through one dispatcher.
#[derive(Debug, Default)]
pub struct Session {
    initialized: AtomicBool,
}

impl Session {
    pub fn state(&self) -> SessionState {
        if self.initialized.load(Ordering::Acquire) {
            SessionState::Ready
        } else {
            SessionState::Uninitialized
        }
    }

    /// Returns `true` only for the call that performed the transition.
    fn mark_ready(&self) -> bool {
        !self.initialized.swap(true, Ordering::AcqRel)
    }
}

impl ServerIdentity {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: description.into(),
        }
    }

    fn to_implementation(&self) -> Implementation {
        Implementation {
            name: self.name.clone(),
            version: self.version.clone(),
            title: None,
            description: Some(self.description.clone()),
            icons: vec![],
            website_url: None,
        }
    }
}

pub struct Dispatcher {
    identity: ServerIdentity,
    capabilities: Capabilities,
    session: Session,
    handler: Arc<dyn Handler>,
}

impl Dispatcher {
    pub fn new(
        identity: ServerIdentity,
        capabilities: Capabilities,
        handler: Arc<dyn Handler>,
    ) -> Self {
        Self {
            identity,
            capabilities,
            session: Session::default(),
            handler,
        }
    }

    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub async fn handle(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        if method == "initialize" {
            return self.initialize(params).await;
        }

        if self.session.state() == SessionState::Uninitialized {
            return Err(RpcError::NotInitialized);
        }

        self.handler
            .dispatch(method, params)
            .await
            .map_err(RpcError::from)
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if !request.has_supported_version() {
            return error_response(request.id, RpcError::InvalidRequest);
        }

        let audit_params = redact_audit_params(request.params.as_ref());
        let response = match self.handle(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::result(request.id, result),
            Err(err) => error_response(request.id, err),
        };

        info!(
            method = %request.method,
            params = %audit_params,
            outcome = if response.is_error() { "failure" } else { "success" },
            "mcp action audited"
        );

        response
    }

    pub async fn handle_bytes(&self, body: &[u8]) -> JsonRpcResponse {
        match decode(body) {
            Ok(request) => self.handle_request(request).await,
            Err(DecodeError::Parse) => error_response(None, RpcError::Parse { detail: None }),
            Err(DecodeError::InvalidRequest { id }) => error_response(id, RpcError::InvalidRequest),
        }
    }

    async fn initialize(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: InitializeParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|err| RpcError::parse(err.to_string()))?;

        let protocol_version = negotiate_protocol_version(&params);
        self.handler.initialize(&params).await;

        let result = InitializeResult {
            protocol_version,
            server_info: self.identity.to_implementation(),
            capabilities: self.capabilities.clone(),
        };
        let result = serde_json::to_value(result).expect("initialize result serialization");

        if self.session.mark_ready() {
            info!(
                server = %self.identity.name,
                client_protocol_version = %params.protocol_version,
                "session initialized"
            );
        }

        Ok(result)
    }
}

/// Compatibility is advisory: a mismatch is logged and the server's own version is answered.
pub fn negotiate_protocol_version(params: &InitializeParams) -> String {
    let server_version: String = ProtocolVersion::V2024_11_05.into();

    if params.protocol_version.trim() != SUPPORTED_PROTOCOL_VERSION {
        warn!(
            requested = %params.protocol_version,
            supported = %server_version,
            "client requested a different protocol version, continuing with server version"
        );
    }

    server_version
}

fn error_response(id: Option<RequestId>, err: RpcError) -> JsonRpcResponse {
    JsonRpcResponse::error(id, err.into_detail())
}
