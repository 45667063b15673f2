//! API Server Entrypoint
//!
//! Wires configuration, the pool router, and the sensitive-data routes
//! into one axum server. Fails fast on configuration errors; database
//! nodes are connected lazily and may come up after the server does.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use vault::{DbConfig, PgSensitiveRepository, PoolRouter, RateSettings, vault_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments set the environment directly
    dotenvy::dotenv().ok();

    init_tracing();

    let db_config = DbConfig::from_env()?;
    let router = Arc::new(PoolRouter::open(&db_config)?);
    let repo = PgSensitiveRepository::new(Arc::clone(&router));

    let app = Router::new()
        .nest(
            "/sensitiveData",
            vault_router(repo, RateSettings::default()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer()?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:31113".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!(%bind_addr, nodes = router.node_count(), "API server starting");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    router.close().await;

    tracing::info!("API server stopped");

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "api=info,vault=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// CORS for the browser frontend
///
/// `FRONTEND_ORIGINS` is a comma-separated origin list; unset means no
/// cross-origin access.
fn cors_layer() -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    if let Ok(raw) = std::env::var("FRONTEND_ORIGINS") {
        for origin in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            origins.push(HeaderValue::from_str(origin)?);
        }
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
