//! Example handler served by the bundled binary.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::HandlerError;
use crate::mcp::server::{Capabilities, Handler, InitializeParams};

#[derive(Debug, Default)]
pub struct EchoHandler;

impl EchoHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn default_capabilities() -> Capabilities {
        Capabilities::from([("echo".to_string(), true)])
    }
}

#[async_trait]
impl Handler for EchoHandler {
    async fn initialize(&self, params: &InitializeParams) {
        debug!(protocol_version = %params.protocol_version, "echo handler initialized");
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, HandlerError> {
        match method {
            "echo" => Ok(params.unwrap_or_else(|| json!({}))),
            "ping" => Ok(json!({})),
            _ => Err(HandlerError::MethodNotFound(method.to_string())),
        }
    }
}
