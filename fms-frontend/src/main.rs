use dotenvy::dotenv;
use fms_frontend::config::get_configuration;
use fms_frontend::services::{build_api, metrics::init_metrics};
use fms_frontend::startup::build_router;
use fms_frontend::AppState;
use service_core::observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "fms-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    init_metrics();

    let api = build_api(&configuration.api)?;
    info!(
        base_url = %configuration.api.base_url,
        backend = ?configuration.api.backend,
        "Payment API configured"
    );

    let app = build_router(AppState::new(api));

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting fms-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
