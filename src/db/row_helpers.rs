use sqlx::{sqlite::SqliteRow, Row};

use crate::models::*;

/// Filter empty strings to None (columns written as '' instead of NULL)
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Decode an optional JSON TEXT column
fn json_column(raw: Option<String>) -> Option<serde_json::Value> {
    none_if_empty(raw).and_then(|s| serde_json::from_str(&s).ok())
}

/// Encode an optional JSON value for a TEXT column
pub fn json_text(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

/// Map a SQLite row to an Event struct
pub fn map_event_row(row: &SqliteRow) -> Event {
    let images_json: String = row.get("images");
    let images: Vec<String> = serde_json::from_str(&images_json).unwrap_or_default();
    let status: String = row.get("status");
    Event {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        name: row.get("name"),
        description: none_if_empty(row.get("description")),
        location: row.get("location"),
        address: none_if_empty(row.get("address")),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        // CHECK constraint keeps the column within the enum
        status: status.parse().unwrap_or_default(),
        capacity: row.get("capacity"),
        config: json_column(row.get("config")),
        images,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a Payment struct
pub fn map_payment_row(row: &SqliteRow) -> anyhow::Result<Payment> {
    let method: String = row.get("payment_method");
    let status: String = row.get("status");
    Ok(Payment {
        id: row.get("id"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        payment_method: method.parse()?,
        status: status.parse()?,
        paid_at: row.get("paid_at"),
        event_id: row.get("event_id"),
        user_id: row.get("user_id"),
        tenant_id: row.get("tenant_id"),
        metadata: json_column(row.get("metadata")),
        created_at: row.get("created_at"),
    })
}

/// Map a SQLite row to a Tenant struct
pub fn map_tenant_row(row: &SqliteRow) -> Tenant {
    Tenant {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to a User struct
pub fn map_user_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}
