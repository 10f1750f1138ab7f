use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::time::interval;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

use bestseller_proxy::config::Config;
use bestseller_proxy::nyt::NytClient;
use bestseller_proxy::proxy::CacheProxy;
use bestseller_proxy::routes;
use bestseller_proxy::state::AppState;
use bestseller_proxy::store::{self, PgSnapshotStore};

#[tokio::main]
async fn main() {
    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "bestseller_proxy=info".into());

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Config::from_env();
    info!(port = config.port, "Starting bestseller-proxy");

    if config.nyt_api_key.is_none() {
        // Not fatal at startup: the first refresh surfaces it as an error.
        tracing::warn!("NYT_API_KEY is not set; refreshes will fail until it is configured");
    }

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    store::migrate(&pool).await.expect("Failed to run migrations");

    let client = NytClient::new(
        &config.nyt_base_url,
        config.nyt_api_key.clone(),
        Duration::from_secs(config.upstream_timeout_secs),
    );

    let proxy = Arc::new(CacheProxy::new(
        Arc::new(PgSnapshotStore::new(pool)),
        Arc::new(client),
        chrono::Duration::hours(config.freshness_hours),
    ));

    // Optional warm-refresh loop so the first request after expiry does not
    // pay the upstream latency. Correctness never depends on it.
    if let Some(hours) = config.background_refresh_hours {
        let refresh_proxy = proxy.clone();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(hours * 3600));
            loop {
                ticker.tick().await;
                if let Err(e) = refresh_proxy.handle().await {
                    error!(error = %e, "Background refresh failed");
                }
            }
        });
        info!(hours, "Background refresh enabled");
    }

    let state = AppState { proxy };

    // CORS
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET])
            .allow_headers([header::CONTENT_TYPE])
    };

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/bestsellers", get(routes::bestsellers::get_bestsellers))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind");

    info!(port = config.port, "Listening");

    axum::serve(listener, app).await.expect("Server failed");
}
