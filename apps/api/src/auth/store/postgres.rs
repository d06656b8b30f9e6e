use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{validate_new_identity, CreateIdentityError, CredentialStore, StoreError};
use crate::auth::identity::{normalize_email, Identity, IdentityId, NewIdentity};
use crate::auth::password::{self, PasswordPolicy};
use crate::auth::role::Role;
use crate::models::user::IdentityRow;

/// Postgres-backed credential store.
///
/// Expects:
/// - `identities (id UUID PK, email TEXT, normalized_email TEXT UNIQUE, password_hash TEXT, created_at TIMESTAMPTZ)`
/// - `roles (name TEXT PK)`
/// - `identity_roles (identity_id UUID PK -> identities, role_name TEXT -> roles)`
pub struct PgCredentialStore {
    pool: PgPool,
    policy: PasswordPolicy,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            policy: PasswordPolicy::default(),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT i.id, i.email, COALESCE(ir.role_name, $2) AS role_name
            FROM identities i
            LEFT JOIN identity_roles ir ON ir.identity_id = i.id
            WHERE i.normalized_email = $1
            "#,
        )
        .bind(normalize_email(email))
        .bind(Role::default().as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from)
            .transpose()
            .map_err(|e| StoreError::Internal(e.to_string()))
    }

    async fn verify_password(&self, identity: &Identity, password: &str) -> Result<bool, StoreError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM identities WHERE id = $1")
                .bind(*identity.id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        let Some(stored) = stored else {
            return Ok(false);
        };

        let password = password.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&password, &stored))
            .await
            .map_err(|e| StoreError::Internal(format!("password verification task failed: {e}")))
    }

    async fn create_identity(&self, new: NewIdentity<'_>) -> Result<Identity, CreateIdentityError> {
        validate_new_identity(&self.policy, &new).map_err(CreateIdentityError::Rejected)?;

        let plain = new.password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .map_err(|e| StoreError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        let id = IdentityId::new();
        let email = new.email.trim();

        let inserted = sqlx::query(
            r#"
            INSERT INTO identities (id, email, normalized_email, password_hash)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(*id.as_uuid())
        .bind(email)
        .bind(normalize_email(email))
        .bind(password_hash)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!("Identity insert lost a uniqueness race");
                return Err(CreateIdentityError::DuplicateEmail);
            }
            Err(e) => return Err(StoreError::from(e).into()),
        }

        info!("Created identity {id}");
        Ok(Identity {
            id,
            email: email.to_string(),
            role: Role::default(),
        })
    }

    async fn ensure_role(&self, role: Role) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn assign_role(&self, identity_id: IdentityId, role: Role) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO identity_roles (identity_id, role_name)
            VALUES ($1, $2)
            ON CONFLICT (identity_id) DO UPDATE SET role_name = EXCLUDED.role_name
            "#,
        )
        .bind(*identity_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
