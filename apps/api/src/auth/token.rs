//! Bearer token issuance and verification (HS256 compact JWS).
//!
//! Tokens are stateless: validity is signature + issuer/audience + expiry,
//! checked against an explicit `now`. There is no server-side revocation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::claims::{validate_time_window, ClaimsTimeError, TokenClaims};
use crate::auth::identity::Identity;
use crate::config::JwtConfig;

/// Fixed lifetime of every issued token.
pub const TOKEN_LIFETIME_MINUTES: i64 = 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("identity has no usable email")]
    InvalidIdentity,

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints signed tokens for verified identities.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            key: EncodingKey::from_secret(config.secret()),
            issuer: config.issuer().to_string(),
            audience: config.audience().to_string(),
        }
    }

    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        if identity.email.trim().is_empty() {
            return Err(TokenError::InvalidIdentity);
        }

        let expires_at = now + Duration::minutes(TOKEN_LIFETIME_MINUTES);
        let claims = TokenClaims {
            jti: Uuid::new_v4().to_string(),
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.key)?;

        Ok(IssuedToken {
            token,
            jti: claims.jti,
            expires_at,
        })
    }
}

/// Why a presented token was not accepted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token issuer mismatch")]
    WrongIssuer,

    #[error("token audience mismatch")]
    WrongAudience,

    #[error("token is malformed")]
    Malformed,
}

impl TokenRejection {
    /// Expired is the only terminal state a well-formed, untampered token reaches.
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenRejection::Expired)
    }
}

/// Checks presented tokens against the same key, issuer and audience the
/// issuer signs with.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.audience()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Expiry is checked against the caller's clock below.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(config.secret()),
            validation,
        }
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenRejection> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                ErrorKind::InvalidIssuer => TokenRejection::WrongIssuer,
                ErrorKind::InvalidAudience => TokenRejection::WrongAudience,
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Malformed,
            })?;

        validate_time_window(&data.claims, now).map_err(|e| match e {
            ClaimsTimeError::Expired => TokenRejection::Expired,
            ClaimsTimeError::InvalidTimeWindow => TokenRejection::Malformed,
        })?;

        Ok(data.claims)
    }
}
