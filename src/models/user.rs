use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account inside a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub tenant_id: String,
    /// Name shown on scoreboards for this user's players
    pub display_name: String,
}

impl UserProfile {
    pub fn new(
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub user_id: String,
    pub tenant_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        UserProfile {
            user_id: record.user_id,
            tenant_id: record.tenant_id,
            display_name: record.display_name,
        }
    }
}
