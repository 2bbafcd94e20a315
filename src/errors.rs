use serde_json::json;
use thiserror::Error;

use crate::mcp::codec::ErrorDetail;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;
pub const SERVER_NOT_INITIALIZED: i64 = -32002;

/// Failures surfaced to the caller as a JSON-RPC error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("Parse error")]
    Parse { detail: Option<String> },
    #[error("Invalid Request")]
    InvalidRequest,
    #[error("Method not found")]
    MethodNotFound,
    #[error("Server not initialized")]
    NotInitialized,
    #[error("{message}")]
    Internal { message: String },
}

/// Failures reported by an application [`Handler`](crate::mcp::server::Handler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("{0}")]
    Failed(String),
}

impl RpcError {
    pub fn parse(detail: impl Into<String>) -> Self {
        Self::Parse {
            detail: Some(detail.into()),
        }
    }

    /// Internal error carrying `message` verbatim.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Parse { .. } => PARSE_ERROR,
            Self::InvalidRequest => INVALID_REQUEST,
            Self::MethodNotFound => METHOD_NOT_FOUND,
            Self::NotInitialized => SERVER_NOT_INITIALIZED,
            Self::Internal { .. } => INTERNAL_ERROR,
        }
    }

    pub fn into_detail(self) -> ErrorDetail {
        let code = self.code();
        let message = self.to_string();
        let data = match self {
            Self::Parse {
                detail: Some(detail),
            } => Some(json!({ "detail": detail })),
            _ => None,
        };

        ErrorDetail {
            code,
            message,
            data,
        }
    }
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<HandlerError> for RpcError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::MethodNotFound(_) => Self::MethodNotFound,
            HandlerError::Failed(message) => Self::Internal { message },
        }
    }
}
