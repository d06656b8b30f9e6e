//! Per-route authorization.
//!
//! Handlers declare what they need by taking an `Authorized<P>` argument;
//! the extractor runs before the handler body and rejects the request with
//! 401 (no/invalid token) or 403 (valid token, wrong role).

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::claims::TokenClaims;
use crate::auth::role::Role;
use crate::auth::token::{TokenRejection, TokenVerifier};
use crate::errors::AppError;
use crate::state::AppState;

/// What a route requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Authenticated,
    AnyOf(&'static [Role]),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("{0}")]
    InvalidToken(TokenRejection),

    #[error("role {actual} is not permitted (requires one of {required:?})")]
    Forbidden {
        actual: Role,
        required: &'static [Role],
    },
}

impl GateError {
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, GateError::Forbidden { .. })
    }
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Decides whether a request may proceed. Anonymous routes never look at the
/// token; everything else needs a verifiable one.
pub fn authorize(
    headers: &HeaderMap,
    verifier: &TokenVerifier,
    access: Access,
    now: DateTime<Utc>,
) -> Result<Option<TokenClaims>, GateError> {
    if access == Access::Anonymous {
        return Ok(None);
    }

    let token = extract_bearer(headers).ok_or(GateError::MissingToken)?;
    let claims = verifier
        .verify(token, now)
        .map_err(GateError::InvalidToken)?;

    if let Access::AnyOf(required) = access {
        if !required.contains(&claims.role) {
            return Err(GateError::Forbidden {
                actual: claims.role,
                required,
            });
        }
    }

    Ok(Some(claims))
}

// ────────────────────────────────────────────────────────────────────────────
// Route policies
// ────────────────────────────────────────────────────────────────────────────

pub trait RolePolicy: Send + Sync + 'static {
    const ACCESS: Access;
}

pub struct AdminOnly;
pub struct AdminOrUser;
pub struct AnyIdentity;

impl RolePolicy for AdminOnly {
    const ACCESS: Access = Access::AnyOf(&[Role::Admin]);
}

impl RolePolicy for AdminOrUser {
    const ACCESS: Access = Access::AnyOf(&[Role::Admin, Role::User]);
}

impl RolePolicy for AnyIdentity {
    const ACCESS: Access = Access::Authenticated;
}

/// Claims of a caller that passed policy `P`.
pub struct Authorized<P: RolePolicy>(pub TokenClaims, PhantomData<P>);

impl<P: RolePolicy> Authorized<P> {
    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }
}

#[axum::async_trait]
impl<P: RolePolicy> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match authorize(&parts.headers, &state.verifier, P::ACCESS, Utc::now()) {
            Ok(Some(claims)) => {
                debug!(
                    "Authorized {} as {} until {:?}",
                    claims.sub,
                    claims.role,
                    claims.expires_at()
                );
                Ok(Authorized(claims, PhantomData))
            }
            // Policies never declare Anonymous.
            Ok(None) => Err(AppError::Unauthenticated),
            Err(e) => {
                if e.is_unauthenticated() {
                    let expired = matches!(&e, GateError::InvalidToken(r) if r.is_expired());
                    warn!(path = %parts.uri.path(), expired, "Unauthenticated request: {e}");
                } else {
                    warn!(path = %parts.uri.path(), "Forbidden request: {e}");
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::{Identity, IdentityId};
    use crate::auth::token::TokenIssuer;
    use crate::config::JwtConfig;
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "gate-test-secret-that-is-long-enough";

    fn config() -> JwtConfig {
        JwtConfig::new(SECRET, "resume-api", "resume-clients").unwrap()
    }

    fn token_for(role: Role, now: DateTime<Utc>) -> String {
        let identity = Identity {
            id: IdentityId::new(),
            email: "c@x.com".to_string(),
            role,
        };
        TokenIssuer::new(&config()).issue(&identity, now).unwrap().token
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&bearer("abc")), Some("abc"));

        let mut lower = HeaderMap::new();
        lower.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(extract_bearer(&lower), Some("abc"));

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&basic), None);

        let mut empty = HeaderMap::new();
        empty.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer  "));
        assert_eq!(extract_bearer(&empty), None);

        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn test_user_token_forbidden_on_admin_route_but_allowed_on_shared() {
        let now = Utc::now();
        let verifier = TokenVerifier::new(&config());
        let headers = bearer(&token_for(Role::User, now));

        let denied = authorize(&headers, &verifier, AdminOnly::ACCESS, now).unwrap_err();
        assert_eq!(
            denied,
            GateError::Forbidden {
                actual: Role::User,
                required: &[Role::Admin],
            }
        );
        assert!(!denied.is_unauthenticated());

        let claims = authorize(&headers, &verifier, AdminOrUser::ACCESS, now)
            .unwrap()
            .unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_admin_token_passes_admin_route() {
        let now = Utc::now();
        let verifier = TokenVerifier::new(&config());
        let headers = bearer(&token_for(Role::Admin, now));
        assert!(authorize(&headers, &verifier, AdminOnly::ACCESS, now).is_ok());
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let verifier = TokenVerifier::new(&config());
        let err = authorize(&HeaderMap::new(), &verifier, AnyIdentity::ACCESS, Utc::now()).unwrap_err();
        assert_eq!(err, GateError::MissingToken);
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_expired_token_is_unauthenticated_not_forbidden() {
        let issued_at = Utc::now() - Duration::minutes(61);
        let verifier = TokenVerifier::new(&config());
        let headers = bearer(&token_for(Role::Admin, issued_at));

        let err = authorize(&headers, &verifier, AdminOnly::ACCESS, Utc::now()).unwrap_err();
        assert_eq!(err, GateError::InvalidToken(TokenRejection::Expired));
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_anonymous_ignores_garbage_token() {
        let verifier = TokenVerifier::new(&config());
        let result = authorize(&bearer("not-a-token"), &verifier, Access::Anonymous, Utc::now());
        assert_eq!(result, Ok(None));
    }
}
