use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::{json_text, map_event_row};

/// Persistence port for events.
///
/// Every call that addresses existing rows takes the owning tenant id;
/// implementations must filter by it so that rows of other tenants are
/// indistinguishable from missing ones.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events of a tenant, newest `start_date` first
    async fn list(&self, tenant_id: &str, status: Option<&str>) -> Result<Vec<Event>>;
    async fn get(&self, tenant_id: &str, id: &str) -> Result<Option<Event>>;
    async fn create(&self, event: &Event) -> Result<Event>;
    /// Overwrite the mutable columns of `event`, matched by id and tenant
    async fn update(&self, event: &Event) -> Result<Event>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<()>;
}

const SELECT_EVENT: &str = r#"
    SELECT id, tenant_id, name, description, location, address, start_date, end_date,
           status, capacity, config, images, created_at, updated_at
    FROM events
"#;

/// Event database operations
pub struct EventRepo;

impl EventRepo {
    pub async fn list(pool: &Pool<Sqlite>, tenant_id: &str, status: Option<&str>) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "{} WHERE tenant_id = ? AND (? IS NULL OR status = ?) ORDER BY start_date DESC",
            SELECT_EVENT
        ))
        .bind(tenant_id)
        .bind(status)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(rows.iter().map(map_event_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, tenant_id: &str, id: &str) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("{} WHERE id = ? AND tenant_id = ?", SELECT_EVENT))
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.as_ref().map(map_event_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, event: &Event) -> Result<Event> {
        let images = serde_json::to_string(&event.images)?;
        sqlx::query(
            r#"
            INSERT INTO events (id, tenant_id, name, description, location, address,
                                start_date, end_date, status, capacity, config, images,
                                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.tenant_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.address)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.status.as_str())
        .bind(event.capacity)
        .bind(json_text(&event.config))
        .bind(&images)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(pool)
        .await?;

        Self::get(pool, &event.tenant_id, &event.id)
            .await?
            .context("Event not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, event: &Event) -> Result<Event> {
        let images = serde_json::to_string(&event.images)?;
        let result = sqlx::query(
            r#"
            UPDATE events SET name = ?, description = ?, location = ?, address = ?,
                              start_date = ?, end_date = ?, status = ?, capacity = ?,
                              config = ?, images = ?, updated_at = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.address)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.status.as_str())
        .bind(event.capacity)
        .bind(json_text(&event.config))
        .bind(&images)
        .bind(event.updated_at)
        .bind(&event.id)
        .bind(&event.tenant_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Event", &event.id).into());
        }

        Self::get(pool, &event.tenant_id, &event.id)
            .await?
            .context("Event not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, tenant_id: &str, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    anyhow::Error::new(super::InUseError::new("Event", id))
                }
                other => anyhow::Error::new(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Event", id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use chrono::{TimeZone, Utc};

    async fn store_with_tenants() -> Store {
        let store = Store::in_memory().await.unwrap();
        for (id, slug) in [("tenant-a", "club-a"), ("tenant-b", "club-b")] {
            let req = CreateTenantRequest {
                name: slug.to_string(),
                slug: slug.to_string(),
            };
            store.create_tenant(id, &req).await.unwrap();
        }
        store
    }

    fn event(id: &str, tenant_id: &str, day: u32, status: EventStatus) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 3, day, 21, 0, 0).unwrap();
        Event {
            id: id.into(),
            tenant_id: tenant_id.into(),
            name: format!("Night {}", day),
            description: None,
            location: "Main Floor".into(),
            address: Some("1 Harbour Street".into()),
            start_date: start,
            end_date: start + chrono::TimeDelta::hours(5),
            status,
            capacity: Some(250),
            config: Some(serde_json::json!({"ticketing": {"presale": true}})),
            images: vec!["https://cdn.example.com/a.jpg".into()],
            created_at: start,
            updated_at: start,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrips_all_columns() {
        let store = store_with_tenants().await;
        let created = store.create(&event("e1", "tenant-a", 1, EventStatus::Draft)).await.unwrap();
        assert_eq!(created, event("e1", "tenant-a", 1, EventStatus::Draft));
    }

    #[tokio::test]
    async fn test_get_is_tenant_scoped() {
        let store = store_with_tenants().await;
        store.create(&event("e1", "tenant-a", 1, EventStatus::Draft)).await.unwrap();

        assert!(EventRepository::get(&store, "tenant-a", "e1").await.unwrap().is_some());
        assert!(EventRepository::get(&store, "tenant-b", "e1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_by_start_desc() {
        let store = store_with_tenants().await;
        store.create(&event("e1", "tenant-a", 1, EventStatus::Active)).await.unwrap();
        store.create(&event("e2", "tenant-a", 9, EventStatus::Active)).await.unwrap();
        store.create(&event("e3", "tenant-a", 5, EventStatus::Draft)).await.unwrap();
        store.create(&event("e4", "tenant-b", 7, EventStatus::Active)).await.unwrap();

        let all = EventRepository::list(&store, "tenant-a", None).await.unwrap();
        let ids: Vec<_> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e3", "e1"]);

        let active = EventRepository::list(&store, "tenant-a", Some("ACTIVE")).await.unwrap();
        let ids: Vec<_> = active.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e1"]);

        let unknown = EventRepository::list(&store, "tenant-a", Some("ARCHIVED")).await.unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_respect_tenant() {
        let store = store_with_tenants().await;
        store.create(&event("e1", "tenant-a", 1, EventStatus::Draft)).await.unwrap();

        let mut foreign = event("e1", "tenant-b", 1, EventStatus::Draft);
        foreign.name = "Hijacked".into();
        let err = EventRepository::update(&store, &foreign).await.unwrap_err();
        assert!(err.downcast_ref::<crate::db::NotFoundError>().is_some());

        let err = EventRepository::delete(&store, "tenant-b", "e1").await.unwrap_err();
        assert!(err.downcast_ref::<crate::db::NotFoundError>().is_some());

        let kept = EventRepository::get(&store, "tenant-a", "e1").await.unwrap().unwrap();
        assert_eq!(kept.name, "Night 1");

        EventRepository::delete(&store, "tenant-a", "e1").await.unwrap();
        assert!(EventRepository::get(&store, "tenant-a", "e1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_with_payments_is_in_use() {
        let store = store_with_tenants().await;
        let e1 = event("e1", "tenant-a", 1, EventStatus::Completed);
        store.create(&e1).await.unwrap();
        let guest = store.create_user("guest@example.com", "Guest", "").await.unwrap();
        store
            .create_payments(&[Payment {
                id: "p1".into(),
                amount: 900,
                currency: "EUR".into(),
                payment_method: PaymentMethod::Wristband,
                status: PaymentStatus::Completed,
                paid_at: Some(e1.start_date),
                event_id: "e1".into(),
                user_id: guest.id,
                tenant_id: "tenant-a".into(),
                metadata: None,
                created_at: e1.start_date,
            }])
            .await
            .unwrap();

        let err = EventRepository::delete(&store, "tenant-a", "e1").await.unwrap_err();
        assert!(err.downcast_ref::<crate::db::InUseError>().is_some());
        assert!(EventRepository::get(&store, "tenant-a", "e1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_negative_capacity_rejected_by_schema() {
        let store = store_with_tenants().await;
        let mut bad = event("e1", "tenant-a", 1, EventStatus::Draft);
        bad.capacity = Some(-1);
        assert!(store.create(&bad).await.is_err());
    }
}
