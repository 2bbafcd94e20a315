use std::{future::Future, future::IntoFuture, io, sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{error, info, warn};

pub mod config;
pub mod echo;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod registry;

use config::Config;
use mcp::server::Dispatcher;
use registry::{RegistryError, ServerRegistry};

pub const MCP_ENDPOINT: &str = "/mcp";
/// Larger request bodies are answered with a bare 413 before reaching the codec.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route(MCP_ENDPOINT, post(http::handlers::mcp_endpoint))
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

/// Binds the listener, then records the server in `registry`. A failed bind leaves the
/// registry untouched.
pub async fn bind_and_register(
    config: &Config,
    registry: &dyn ServerRegistry,
) -> Result<TcpListener, StartupError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| StartupError::Bind {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;
    registry.register(config.registry_entry())?;
    Ok(listener)
}

/// Serves `app` until `shutdown` resolves, then drains in-flight requests for at most `grace`.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let signal = async move {
        shutdown.await;
        let _ = drain_tx.send(());
    };

    let server = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(signal)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = drain_rx => {}
    }

    info!(grace_secs = grace.as_secs(), "draining in-flight requests");
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                grace_secs = grace.as_secs(),
                "grace period elapsed with requests still in flight"
            );
            Ok(())
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
