use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::identity::{Identity, IdentityId};
use crate::auth::role::{Role, UnknownRole};

/// Identity joined with its role binding. `role_name` falls back to the
/// default role in SQL when no binding exists yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IdentityRow {
    pub id: Uuid,
    pub email: String,
    pub role_name: String,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = UnknownRole;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: IdentityId::from_uuid(row.id),
            email: row.email,
            role: row.role_name.parse::<Role>()?,
        })
    }
}
