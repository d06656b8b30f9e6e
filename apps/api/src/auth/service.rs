//! Registration and login workflows.
//!
//! Expected outcomes (bad input, duplicate email, wrong credentials) come back
//! as typed `AuthError` variants. Only store/infrastructure trouble is
//! reported as `AuthError::Unavailable`, and it is never folded into
//! `InvalidCredentials`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::auth::deadline::Deadline;
use crate::auth::identity::NewIdentity;
use crate::auth::password::{self, IdentityError};
use crate::auth::role::Role;
use crate::auth::store::{CreateIdentityError, CredentialStore, StoreError};
use crate::auth::token::{IssuedToken, TokenError, TokenIssuer};

pub const REGISTERED_MESSAGE: &str = "User registered successfully.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("user already exists")]
    Conflict,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user creation failed")]
    CreationFailed(Vec<IdentityError>),

    #[error("identity has no usable email")]
    InvalidIdentity,

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => AuthError::Unavailable(msg),
            StoreError::Internal(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InvalidIdentity => AuthError::InvalidIdentity,
            TokenError::Signing(e) => AuthError::Internal(e.to_string()),
        }
    }
}

/// Body of `POST /register`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct RegistrationConfirmation {
    pub message: &'static str,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, issuer: TokenIssuer, store_timeout: Duration) -> Self {
        Self {
            store,
            issuer,
            store_timeout,
        }
    }

    /// Creates every role up front so the first registrations don't race on it.
    pub async fn seed_roles(&self) -> Result<(), AuthError> {
        let deadline = Deadline::after(self.store_timeout);
        for role in Role::ALL {
            deadline.run(self.store.ensure_role(role)).await?;
        }
        info!("Seeded roles: {:?}", Role::ALL);

        let warmed = tokio::task::spawn_blocking(password::warm_dummy_hash)
            .await
            .map_err(|e| AuthError::Internal(format!("dummy hash task failed: {e}")))?;
        if !warmed {
            warn!("Dummy password hash unavailable; unknown-email logins will return faster");
        }
        Ok(())
    }

    pub async fn register(&self, req: &RegistrationRequest) -> Result<RegistrationConfirmation, AuthError> {
        let email = req.email.trim();
        if email.is_empty() || req.password.is_empty() {
            return Err(AuthError::Validation(
                "email and password are required".to_string(),
            ));
        }
        if req.password != req.confirm_password {
            return Err(AuthError::Validation("passwords do not match".to_string()));
        }

        let deadline = Deadline::after(self.store_timeout);

        if deadline.run(self.store.find_by_email(email)).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        let created = deadline
            .run(self.store.create_identity(NewIdentity {
                email,
                password: &req.password,
            }))
            .await;
        let identity = match created {
            Ok(identity) => identity,
            Err(CreateIdentityError::DuplicateEmail) => return Err(AuthError::Conflict),
            Err(CreateIdentityError::Rejected(errors)) => {
                debug!("Identity creation rejected with {} error(s)", errors.len());
                return Err(AuthError::CreationFailed(errors));
            }
            Err(CreateIdentityError::Store(e)) => return Err(e.into()),
        };

        let role = Role::default();
        let bound = async {
            deadline.run(self.store.ensure_role(role)).await?;
            deadline.run(self.store.assign_role(identity.id, role)).await
        }
        .await;
        if let Err(e) = bound {
            error!("Identity {} created but role {role} not bound: {e}", identity.id);
            return Err(e.into());
        }

        info!("Registered identity {} with role {role}", identity.id);
        Ok(RegistrationConfirmation {
            message: REGISTERED_MESSAGE,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let deadline = Deadline::after(self.store_timeout);

        let Some(identity) = deadline.run(self.store.find_by_email(email)).await? else {
            let password = password.to_string();
            let _ = tokio::task::spawn_blocking(move || password::verify_against_dummy(&password)).await;
            warn!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if !deadline
            .run(self.store.verify_password(&identity, password))
            .await?
        {
            warn!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issuer.issue(&identity, Utc::now())?;
        info!(
            "Issued token {} for identity {} (role {}), {}ms of store budget left",
            issued.jti,
            identity.id,
            identity.role,
            deadline.remaining().as_millis()
        );
        Ok(issued)
    }
}
