use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::{json_text, map_payment_row};

/// Read-side persistence port for payments
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Payments of a tenant, newest first, optionally narrowed by status and event
    async fn list_payments(&self, tenant_id: &str, filter: &PaymentFilter) -> Result<Vec<Payment>>;
}

/// Payment database operations
pub struct PaymentRepo;

impl PaymentRepo {
    pub async fn list(pool: &Pool<Sqlite>, tenant_id: &str, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let status = filter.status.as_deref();
        let event_id = filter.event_id.as_deref();
        let rows = sqlx::query(
            r#"
            SELECT id, amount, currency, payment_method, status, paid_at, event_id,
                   user_id, tenant_id, metadata, created_at
            FROM payments
            WHERE tenant_id = ?
              AND (? IS NULL OR status = ?)
              AND (? IS NULL OR event_id = ?)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .bind(status)
        .bind(event_id)
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        rows.iter().map(map_payment_row).collect()
    }

    /// Insert many payments in one transaction
    pub async fn create_many(pool: &Pool<Sqlite>, payments: &[Payment]) -> Result<u64> {
        let mut tx = pool.begin().await?;
        for payment in payments {
            sqlx::query(
                r#"
                INSERT INTO payments (id, amount, currency, payment_method, status, paid_at,
                                      event_id, user_id, tenant_id, metadata, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&payment.id)
            .bind(payment.amount)
            .bind(&payment.currency)
            .bind(payment.payment_method.as_str())
            .bind(payment.status.as_str())
            .bind(payment.paid_at)
            .bind(&payment.event_id)
            .bind(&payment.user_id)
            .bind(&payment.tenant_id)
            .bind(json_text(&payment.metadata))
            .bind(payment.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(payments.len() as u64)
    }
}
