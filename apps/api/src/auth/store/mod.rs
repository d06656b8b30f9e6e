//! Credential store seam: the only stateful collaborator of the auth core.
//!
//! Uniqueness of emails and existence of roles are enforced by the store,
//! not by the workflows, so concurrent registrations stay correct even when
//! both pass the workflow's pre-check.

#[cfg(test)]
pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::identity::{Identity, IdentityId, NewIdentity};
use crate::auth::password::{check_email, IdentityError, PasswordPolicy};
use crate::auth::role::Role;

pub use postgres::PgCredentialStore;

/// Infrastructure failure reaching or using the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("credential store internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Database(_) => StoreError::Unavailable(e.to_string()),
            // Decode and row-shape errors mean the schema and the code disagree.
            other => StoreError::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateIdentityError {
    #[error("an identity with this email already exists")]
    DuplicateEmail,

    #[error("identity rejected by store policy")]
    Rejected(Vec<IdentityError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn verify_password(&self, identity: &Identity, password: &str) -> Result<bool, StoreError>;

    /// Validates, hashes and inserts. A concurrent duplicate surfaces as
    /// `DuplicateEmail`, never as a store failure.
    async fn create_identity(&self, new: NewIdentity<'_>) -> Result<Identity, CreateIdentityError>;

    /// Idempotent: succeeds whether or not the role already exists.
    async fn ensure_role(&self, role: Role) -> Result<(), StoreError>;

    /// Binds `role` as the identity's single role, replacing any previous one.
    async fn assign_role(&self, identity_id: IdentityId, role: Role) -> Result<(), StoreError>;
}

/// Store-side acceptance rules shared by every adapter.
pub fn validate_new_identity(
    policy: &PasswordPolicy,
    new: &NewIdentity<'_>,
) -> Result<(), Vec<IdentityError>> {
    let mut errors = Vec::new();
    if let Some(e) = check_email(new.email.trim()) {
        errors.push(e);
    }
    errors.extend(policy.check(new.password));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_new_identity_merges_email_and_password_errors() {
        let new = NewIdentity {
            email: "nope",
            password: "short",
        };
        let errors = validate_new_identity(&PasswordPolicy::default(), &new).unwrap_err();
        assert_eq!(errors[0].code, "InvalidEmail");
        assert!(errors.iter().any(|e| e.code == "PasswordTooShort"));
    }

    #[test]
    fn test_validate_new_identity_accepts_good_input() {
        let new = NewIdentity {
            email: "a@x.com",
            password: "Secret123!",
        };
        assert!(validate_new_identity(&PasswordPolicy::default(), &new).is_ok());
    }

    #[test]
    fn test_connection_failures_are_unavailable() {
        for e in [sqlx::Error::PoolTimedOut, sqlx::Error::PoolClosed] {
            assert!(matches!(StoreError::from(e), StoreError::Unavailable(_)));
        }
        let io = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(StoreError::from(io), StoreError::Unavailable(_)));
    }

    #[test]
    fn test_schema_mismatch_is_internal() {
        let cases = [
            sqlx::Error::RowNotFound,
            sqlx::Error::ColumnNotFound("role_name".to_string()),
            sqlx::Error::ColumnDecode {
                index: "email".to_string(),
                source: "expected TEXT".into(),
            },
        ];
        for e in cases {
            assert!(matches!(StoreError::from(e), StoreError::Internal(_)));
        }
    }
}
