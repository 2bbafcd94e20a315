use std::sync::Arc;

use mcp_http_server::{
    bind_and_register, build_app,
    config::Config,
    echo::EchoHandler,
    logging,
    mcp::server::{Dispatcher, ServerIdentity},
    registry::JsonFileRegistry,
    serve, shutdown_signal, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_logging(&config.log_level);

    let registry = match &config.registry_path {
        Some(path) => JsonFileRegistry::new(path),
        None => JsonFileRegistry::at_default_path()?,
    };
    let listener = bind_and_register(&config, &registry).await?;

    let dispatcher = Dispatcher::new(
        ServerIdentity::new(&config.name, &config.description),
        config.capabilities.clone(),
        Arc::new(EchoHandler::new()),
    );
    let app = build_app(AppState::new(dispatcher));

    info!(
        name = %config.name,
        host = %config.host,
        port = config.port,
        registry = %registry.path().display(),
        "server starting"
    );

    serve(listener, app, shutdown_signal(), config.shutdown_grace).await?;
    info!("server stopped");
    Ok(())
}
