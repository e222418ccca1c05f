use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
}

/// Canonical tenant membership roles
pub mod tenant_role {
    pub const OWNER: &str = "OWNER";
    pub const ADMIN: &str = "ADMIN";
    pub const STAFF: &str = "STAFF";
}

/// A user's membership in one tenant
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantMembership {
    pub tenant_id: String,
    pub tenant_name: String,
    pub role: String,
}
