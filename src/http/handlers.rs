//! Axum HTTP handlers for the web server
//!
//! Provides the JSON-RPC endpoint plus health and discovery metadata.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::mcp::codec::encode;
use crate::{AppState, MCP_ENDPOINT};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: String,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery(State(state): State<AppState>) -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: state.dispatcher.identity().name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: MCP_ENDPOINT,
    })
}

/// JSON-RPC failures are still HTTP 200; only the router answers with bare statuses
/// (405 for non-POST, 413 for bodies over [`MAX_BODY_BYTES`](crate::MAX_BODY_BYTES)).
pub async fn mcp_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let response = state.dispatcher.handle_bytes(&body).await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        encode(&response),
    )
        .into_response()
}
