use std::net::SocketAddr;

use api::{app, cache::CacheService, config::ConfigStore, state::AppState};
use axum::http::HeaderValue;
use sqlx::migrate::Migrator;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ConfigStore::load();
    let port: u16 = config.get_i64("port", 8001).clamp(1, 65535) as u16;

    let pool = match std::env::var("DATABASE_URL").ok() {
        None => {
            tracing::warn!("DATABASE_URL not set, analytics routes will be unavailable");
            None
        }
        Some(url) => {
            sqlx::any::install_default_drivers();
            match sqlx::any::AnyPoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to connect database");
                    None
                }
            }
        }
    };

    if let Some(ref pool) = pool {
        if let Err(e) = MIGRATOR.run(pool).await {
            tracing::warn!(error = %e, "failed to run migrations");
        }
    }

    let state = AppState::new(pool, config, CacheService::in_memory());

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_headers(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any);

    let app = app(state).layer(TraceLayer::new_for_http()).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "analytics backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener");
    axum::serve(listener, app).await.expect("serve");
}
