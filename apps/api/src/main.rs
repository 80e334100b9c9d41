mod admin;
mod audit;
mod auth;
mod config;
mod correlation;
mod db;
mod documents;
mod errors;
mod genai;
mod models;
mod prompt;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::genai::GenerationClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (aborts on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting GenAI drafting API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize PostgreSQL and apply migrations
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    // One-time admin bootstrap, when configured
    if let Some(bootstrap) = &config.admin_bootstrap {
        auth::bootstrap_admin(&pool, bootstrap).await?;
    }

    // Initialize the generation client
    let genai = GenerationClient::new(&config);
    info!("Generation client initialized (model: {})", genai.model());

    let state = AppState {
        db: pool,
        genai,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
