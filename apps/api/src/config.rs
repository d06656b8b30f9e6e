use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

/// Shortest signing secret accepted, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or the JWT settings are weak.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub store_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jwt = JwtConfig::new(
            require_env("JWT_SECRET")?,
            require_env("JWT_ISSUER")?,
            require_env("JWT_AUDIENCE")?,
        )?;

        let store_timeout_ms = match std::env::var("STORE_TIMEOUT_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("STORE_TIMEOUT_MS must be a whole number of milliseconds")?,
            Err(_) => DEFAULT_STORE_TIMEOUT_MS,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt,
            store_timeout: Duration::from_millis(store_timeout_ms),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("JWT secret must be at least 32 bytes (got {0})")]
    WeakSecret(usize),

    #[error("JWT issuer is not configured")]
    MissingIssuer,

    #[error("JWT audience is not configured")]
    MissingAudience,
}

/// Signing material shared by the token issuer and verifier.
///
/// Only constructible through [`JwtConfig::new`], so holding one proves the
/// secret meets the entropy floor.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    issuer: String,
    audience: String,
}

impl JwtConfig {
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let secret = secret.into();
        let issuer = issuer.into();
        let audience = audience.into();

        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigurationError::WeakSecret(secret.len()));
        }
        if issuer.trim().is_empty() {
            return Err(ConfigurationError::MissingIssuer);
        }
        if audience.trim().is_empty() {
            return Err(ConfigurationError::MissingAudience);
        }

        Ok(Self {
            secret,
            issuer,
            audience,
        })
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}
