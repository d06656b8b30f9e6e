//! Password policy and Argon2id hashing used by the credential stores.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) with a per-password random
//! salt, so the stored value is self-describing and never reversible.

use std::sync::OnceLock;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// One structured reason the store refused to create an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    fn new(code: &str, description: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// Complexity rules applied on identity creation.
///
/// Defaults match the identity framework the accounts were first created
/// under, so existing passwords stay valid.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Returns every violated rule, in a stable order. Empty means accepted.
    pub fn check(&self, password: &str) -> Vec<IdentityError> {
        let mut errors = Vec::new();

        if password.chars().count() < self.required_length {
            errors.push(IdentityError::new(
                "PasswordTooShort",
                format!(
                    "Passwords must be at least {} characters.",
                    self.required_length
                ),
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_alphanumeric()) {
            errors.push(IdentityError::new(
                "PasswordRequiresNonAlphanumeric",
                "Passwords must have at least one non alphanumeric character.",
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(IdentityError::new(
                "PasswordRequiresDigit",
                "Passwords must have at least one digit ('0'-'9').",
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresLower",
                "Passwords must have at least one lowercase ('a'-'z').",
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresUpper",
                "Passwords must have at least one uppercase ('A'-'Z').",
            ));
        }

        errors
    }
}

/// Minimal shape check; the email doubles as the login name.
pub fn check_email(email: &str) -> Option<IdentityError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };
    if valid {
        None
    } else {
        Some(IdentityError::new(
            "InvalidEmail",
            format!("Email '{email}' is invalid."),
        ))
    }
}

pub fn hash_password(password: &str) -> Result<String, HashError> {
    hash_password_with(&Argon2::default(), password)
}

/// Hashes with explicit Argon2 parameters. Verification reads the
/// parameters back from the PHC string, so any cost setting verifies.
pub fn hash_password_with(argon2: &Argon2<'_>, password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError(e.to_string()))
}

/// Constant-work comparison of `password` against a stored PHC hash.
/// A stored value that does not parse never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is unparseable: {e}");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

static DUMMY: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY
        .get_or_init(|| hash_password("dummy-password-for-timing").ok())
        .as_deref()
}

/// Builds the dummy hash ahead of the first login, so an unknown email never
/// pays for hashing on top of verification. Returns whether it is available.
pub fn warm_dummy_hash() -> bool {
    dummy_hash().is_some()
}

/// Spends the same work as a real verification when no identity matched,
/// so response time does not reveal whether an email is registered.
pub fn verify_against_dummy(password: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(password: &str) -> Vec<String> {
        PasswordPolicy::default()
            .check(password)
            .into_iter()
            .map(|e| e.code)
            .collect()
    }

    #[test]
    fn test_policy_accepts_complex_password() {
        assert!(codes("Secret123!").is_empty());
        assert!(codes("Pw123!").is_empty());
    }

    #[test]
    fn test_policy_collects_every_violation() {
        assert_eq!(
            codes("abc"),
            vec![
                "PasswordTooShort",
                "PasswordRequiresNonAlphanumeric",
                "PasswordRequiresDigit",
                "PasswordRequiresUpper",
            ]
        );
    }

    #[test]
    fn test_policy_short_but_otherwise_complex() {
        assert_eq!(codes("Pw1!"), vec!["PasswordTooShort"]);
    }

    #[test]
    fn test_policy_rules_can_be_relaxed() {
        let policy = PasswordPolicy {
            require_non_alphanumeric: false,
            require_uppercase: false,
            ..PasswordPolicy::default()
        };
        assert!(policy.check("secret1").is_empty());
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("a@x.com").is_none());
        assert!(check_email("no-at-sign").is_some());
        assert!(check_email("@x.com").is_some());
        assert!(check_email("a@").is_some());
        assert!(check_email("a@b@c").is_some());
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let first = hash_password("Secret123!").unwrap();
        let second = hash_password("Secret123!").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("Secret123!", &first));
        assert!(verify_password("Secret123!", &second));
        assert!(!verify_password("secret123!", &first));
    }

    #[test]
    fn test_warmed_dummy_is_ready_before_first_use() {
        assert!(warm_dummy_hash());
        assert!(DUMMY.get().is_some_and(|hash| hash.is_some()));
        verify_against_dummy("whatever");
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
