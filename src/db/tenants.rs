use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::map_tenant_row;

pub struct TenantRepo;

impl TenantRepo {
    pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }

    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_tenant_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, id: &str, req: &CreateTenantRequest) -> Result<Tenant> {
        sqlx::query("INSERT INTO tenants (id, name, slug, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(&req.name)
            .bind(&req.slug)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Self::get(pool, id)
            .await?
            .context("Tenant not found after creation")
    }

    pub async fn add_member(pool: &Pool<Sqlite>, tenant_id: &str, user_id: &str, role: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO tenant_users (tenant_id, user_id, role, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(role)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Memberships of a user, oldest first
    pub async fn memberships(pool: &Pool<Sqlite>, user_id: &str) -> Result<Vec<TenantMembership>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT tu.tenant_id, t.name, tu.role
            FROM tenant_users tu
            JOIN tenants t ON t.id = tu.tenant_id
            WHERE tu.user_id = ?
            ORDER BY tu.created_at, t.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tenant_id, tenant_name, role)| TenantMembership {
                tenant_id,
                tenant_name,
                role,
            })
            .collect())
    }
}
