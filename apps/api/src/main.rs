mod auth;
mod config;
mod db;
mod errors;
mod models;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::service::AuthService;
use crate::auth::store::PgCredentialStore;
use crate::auth::token::{TokenIssuer, TokenVerifier};
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing variable or weak JWT secret stops startup here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));
    info!("JWT settings: {:?}", config.jwt);

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.store_timeout).await?;

    // Token issuer and verifier share one validated JwtConfig
    let issuer = TokenIssuer::new(&config.jwt);
    let verifier = TokenVerifier::new(&config.jwt);

    let store = Arc::new(PgCredentialStore::new(db.clone()));
    let auth = AuthService::new(store, issuer, config.store_timeout);
    auth.seed_roles().await?;

    // Build app state
    let state = AppState {
        db,
        auth: Arc::new(auth),
        verifier: Arc::new(verifier),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
