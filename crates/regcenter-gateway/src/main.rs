use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use regcenter_gateway::startup::{LoggingConfig, init_logging, http_server};
use regcenter_gateway::{AppState, Cli, ConsulConnector, GatewayConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = GatewayConfig::load(&cli).context("failed to load configuration")?;

    let logging_config = LoggingConfig::from_config(&config.log).with_env_overrides();
    let _logging_guard = init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = Arc::new(config);
    let app_state = Arc::new(AppState::new(config.clone(), Arc::new(ConsulConnector)));

    info!(
        bind = %config.service.server_bind_addr,
        port = config.service.port,
        registry = %format!("{}:{}", config.registry.host, config.registry.port),
        security_enabled = config.security.enabled,
        zero_trust_enabled = config.security.zero_trust_enabled,
        "Starting regcenter gateway"
    );

    let server = http_server(
        app_state.clone(),
        config.service.server_bind_addr.clone(),
        config.service.port,
    )
    .context("failed to bind HTTP server")?;

    if config.registry.self_register
        && let Err(e) = app_state.registry_service.register_self().await
    {
        warn!(error = %e, "Self-registration failed, continuing without it");
    }

    // Runs until Ctrl-C / SIGTERM; actix stops accepting and drains workers
    let result = server.await;

    if config.registry.self_register
        && let Err(e) = app_state.registry_service.deregister_self().await
    {
        warn!(error = %e, "Deregistration failed");
    }

    if let Err(e) = &result {
        error!(error = %e, "HTTP server terminated with error");
    }
    info!("Regcenter gateway stopped");
    result.context("HTTP server failed")
}
