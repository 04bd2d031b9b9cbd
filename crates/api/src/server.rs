use std::net::SocketAddr;

use settings_loader::AppSettings;

use crate::{router::create_router, state::AppState};

/// Run the API server
pub async fn run_server(settings: AppSettings) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend_api=debug,tower_http=debug,axum=trace".into()),
        )
        .init();

    let addr = format!("{}:{}", settings.host, settings.port).parse::<SocketAddr>()?;
    let state = AppState::new(settings);
    let app = create_router(state);

    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
