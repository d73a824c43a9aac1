use portal_frontend::config::get_configuration;
use portal_frontend::services::api_client::BackendClient;
use portal_frontend::startup::{build_router, RouterOptions};
use portal_frontend::AppState;
use service_core::observability::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "portal-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    portal_frontend::services::metrics::init_metrics()?;

    let backend = Arc::new(BackendClient::new(configuration.backend.clone())?);
    info!(
        backend = %backend.base_url(),
        timeout_ms = configuration.backend.timeout_ms,
        "Backend client ready"
    );

    let state = AppState::new(backend, configuration.school.clone());
    let options = RouterOptions {
        secure_cookies: configuration.server.secure_cookies,
        session_hours: configuration.server.session_hours,
        static_dir: configuration.server.static_dir.clone(),
    };
    let app = build_router(state, options);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting portal-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
