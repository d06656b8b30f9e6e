use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::service::AuthService;
use crate::auth::token::TokenVerifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthService>,
    /// Built from the same `JwtConfig` as the issuer inside `auth`.
    pub verifier: Arc<TokenVerifier>,
}
