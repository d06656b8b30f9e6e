use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;

use super::{validate_new_identity, CreateIdentityError, CredentialStore, StoreError};
use crate::auth::identity::{normalize_email, Identity, IdentityId, NewIdentity};
use crate::auth::password::{self, PasswordPolicy};
use crate::auth::role::Role;

struct StoredIdentity {
    id: IdentityId,
    email: String,
    password_hash: String,
    role: Option<Role>,
}

/// In-memory credential store for tests. Same acceptance rules as the
/// Postgres adapter, cheap Argon2 parameters.
pub struct InMemoryCredentialStore {
    identities: RwLock<HashMap<String, StoredIdentity>>,
    roles: RwLock<HashSet<Role>>,
    policy: PasswordPolicy,
    argon2: Argon2<'static>,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Internal("in-memory store lock poisoned".to_string())
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid argon2 params");
        Self {
            identities: RwLock::new(HashMap::new()),
            roles: RwLock::new(HashSet::new()),
            policy: PasswordPolicy::default(),
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.identities
            .read()
            .map(|m| m.contains_key(&normalize_email(email)))
            .unwrap_or(false)
    }

    pub fn bound_role(&self, email: &str) -> Option<Role> {
        self.identities
            .read()
            .ok()
            .and_then(|m| m.get(&normalize_email(email)).and_then(|s| s.role))
    }

    pub fn role_exists(&self, role: Role) -> bool {
        self.roles.read().map(|r| r.contains(&role)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.identities.read().map(|m| m.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let identities = self.identities.read().map_err(poisoned)?;
        Ok(identities.get(&normalize_email(email)).map(|s| Identity {
            id: s.id,
            email: s.email.clone(),
            role: s.role.unwrap_or_default(),
        }))
    }

    async fn verify_password(&self, identity: &Identity, password: &str) -> Result<bool, StoreError> {
        let identities = self.identities.read().map_err(poisoned)?;
        Ok(identities
            .values()
            .find(|s| s.id == identity.id)
            .map(|s| password::verify_password(password, &s.password_hash))
            .unwrap_or(false))
    }

    async fn create_identity(&self, new: NewIdentity<'_>) -> Result<Identity, CreateIdentityError> {
        validate_new_identity(&self.policy, &new).map_err(CreateIdentityError::Rejected)?;

        let password_hash = password::hash_password_with(&self.argon2, new.password)
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        let email = new.email.trim();
        let key = normalize_email(email);
        let mut identities = self.identities.write().map_err(poisoned)?;
        if identities.contains_key(&key) {
            return Err(CreateIdentityError::DuplicateEmail);
        }

        let id = IdentityId::new();
        identities.insert(
            key,
            StoredIdentity {
                id,
                email: email.to_string(),
                password_hash,
                role: None,
            },
        );

        Ok(Identity {
            id,
            email: email.to_string(),
            role: Role::default(),
        })
    }

    async fn ensure_role(&self, role: Role) -> Result<(), StoreError> {
        self.roles.write().map_err(poisoned)?.insert(role);
        Ok(())
    }

    async fn assign_role(&self, identity_id: IdentityId, role: Role) -> Result<(), StoreError> {
        if !self.role_exists(role) {
            return Err(StoreError::Internal(format!("role {role} does not exist")));
        }
        let mut identities = self.identities.write().map_err(poisoned)?;
        let stored = identities
            .values_mut()
            .find(|s| s.id == identity_id)
            .ok_or_else(|| StoreError::Internal(format!("identity {identity_id} not found")))?;
        stored.role = Some(role);
        Ok(())
    }
}
