use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::identity::IdentityId;
use crate::auth::role::Role;

/// Claim set embedded in every bearer token.
///
/// `role` is a snapshot taken at issuance; it is never re-checked against the
/// store, so a token can outlive a role change until it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Unique token id.
    pub jti: String,
    pub sub: IdentityId,
    pub email: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Absolute expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Flattened `{type, value}` view used by the claims introspection route.
    pub fn to_pairs(&self) -> Vec<ClaimPair> {
        vec![
            ClaimPair::new("jti", self.jti.clone()),
            ClaimPair::new("sub", self.sub.to_string()),
            ClaimPair::new("email", self.email.clone()),
            ClaimPair::new("role", self.role.to_string()),
            ClaimPair::new("iss", self.iss.clone()),
            ClaimPair::new("aud", self.aud.clone()),
            ClaimPair::new("iat", self.iat.to_string()),
            ClaimPair::new("exp", self.exp.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimPair {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl ClaimPair {
    fn new(claim_type: &str, value: String) -> Self {
        Self {
            claim_type: claim_type.to_string(),
            value,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClaimsTimeError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Checks the time window of already signature-verified claims against `now`.
/// A token is expired from the exact second of its `exp` onward.
pub fn validate_time_window(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), ClaimsTimeError> {
    if claims.exp <= claims.iat {
        return Err(ClaimsTimeError::InvalidTimeWindow);
    }
    if now.timestamp() >= claims.exp {
        return Err(ClaimsTimeError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn claims(iat: i64, exp: i64) -> TokenClaims {
        TokenClaims {
            jti: "jti".to_string(),
            sub: IdentityId::new(),
            email: "a@x.com".to_string(),
            role: Role::User,
            iss: "issuer".to_string(),
            aud: "audience".to_string(),
            iat,
            exp,
        }
    }

    #[test]
    fn test_within_window_is_valid() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        assert_eq!(validate_time_window(&claims(1_000, 4_600), now), Ok(()));
    }

    #[test]
    fn test_expired_at_exact_expiry() {
        let now = Utc.timestamp_opt(4_600, 0).unwrap();
        assert_eq!(
            validate_time_window(&claims(1_000, 4_600), now),
            Err(ClaimsTimeError::Expired)
        );
    }

    #[test]
    fn test_inverted_window_rejected() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        assert_eq!(
            validate_time_window(&claims(2_000, 2_000), now),
            Err(ClaimsTimeError::InvalidTimeWindow)
        );
    }

    #[test]
    fn test_pairs_expose_role_and_subject() {
        let c = claims(1, 2);
        let pairs = c.to_pairs();
        assert!(pairs
            .iter()
            .any(|p| p.claim_type == "role" && p.value == "User"));
        assert!(pairs
            .iter()
            .any(|p| p.claim_type == "sub" && p.value == c.sub.to_string()));
    }
}
