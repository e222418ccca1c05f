//! Test application setup: in-memory store, two tenants, token minting
//! and a thin request helper over the router.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::issue_token;
use crate::config::Config;
use crate::db::{EventRepository, Store};
use crate::models::*;
use crate::{router, AppState};

const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        db_path: ":memory:".into(),
        db_max_connections: 1,
        listen_addr: "127.0.0.1:0".into(),
        frontend_dir: None,
        jwt_secret: TEST_SECRET.into(),
        jwt_ttl_hours: 1,
        seed_demo_data: false,
        cors_allow_origin: "*".into(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Store,
}

impl TestApp {
    /// Fresh app with tenants `tenant-a` (club-a) and `tenant-b` (club-b)
    pub async fn new() -> Self {
        let store = seeded_store().await;
        let state = AppState::new(store.clone(), test_config());
        Self::from_state(state)
    }

    /// Same as `new`, with a substitute event repository
    pub async fn with_events(events: Arc<dyn EventRepository>) -> Self {
        let store = seeded_store().await;
        let mut state = AppState::new(store.clone(), test_config());
        state.events = events;
        Self::from_state(state)
    }

    fn from_state(state: AppState) -> Self {
        let store = state.store.clone();
        Self {
            router: router::build(Arc::new(state)),
            store,
        }
    }

    /// Mint a token for `tenant`; `None` yields a valid token with no tenant
    pub fn token(&self, tenant: Option<&str>) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "test-user".into(),
            email: "test@example.com".into(),
            tenant_id: tenant.map(str::to_string),
            role: tenant.map(|_| tenant_role::ADMIN.to_string()),
            exp: (now + 3600) as usize,
            iat: now as usize,
        };
        issue_token(&claims, TEST_SECRET).unwrap()
    }

    /// Send a request with a raw bearer token and decode the JSON reply
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    fn tenant_token(&self, tenant: Option<&str>) -> Option<String> {
        tenant.map(|t| self.token(Some(t)))
    }

    pub async fn get(&self, uri: &str, tenant: Option<&str>) -> (StatusCode, Value) {
        let token = self.tenant_token(tenant);
        self.send("GET", uri, token.as_deref(), None).await
    }

    pub async fn post(&self, uri: &str, tenant: Option<&str>, body: Value) -> (StatusCode, Value) {
        let token = self.tenant_token(tenant);
        self.send("POST", uri, token.as_deref(), Some(body)).await
    }

    pub async fn put(&self, uri: &str, tenant: Option<&str>, body: Value) -> (StatusCode, Value) {
        let token = self.tenant_token(tenant);
        self.send("PUT", uri, token.as_deref(), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, tenant: Option<&str>) -> (StatusCode, Value) {
        let token = self.tenant_token(tenant);
        self.send("DELETE", uri, token.as_deref(), None).await
    }

    /// Register a dashboard user with ADMIN membership in each tenant
    pub async fn add_operator(&self, email: &str, password: &str, tenants: &[&str]) -> User {
        // Minimum cost keeps the suite fast
        let hash = bcrypt::hash(password, 4).unwrap();
        let user = self.store.create_user(email, "Operator", &hash).await.unwrap();
        for tenant in tenants {
            self.store
                .add_tenant_member(tenant, &user.id, tenant_role::ADMIN)
                .await
                .unwrap();
        }
        user
    }

    /// Create an event with a handful of payments under `tenant`.
    /// Returns the event id and the number of payments.
    pub async fn seed_payments(&self, tenant: &str) -> (String, usize) {
        let start = Utc.with_ymd_and_hms(2025, 5, 10, 21, 0, 0).unwrap();
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant.to_string(),
            name: "Payments Night".into(),
            description: None,
            location: "Bar".into(),
            address: None,
            start_date: start,
            end_date: start + chrono::TimeDelta::hours(6),
            status: EventStatus::Completed,
            capacity: None,
            config: None,
            images: vec![],
            created_at: start,
            updated_at: start,
        };
        EventRepository::create(&self.store, &event).await.unwrap();

        let guest = self
            .store
            .create_user(&format!("guest-{}@example.com", event.id), "Guest", "")
            .await
            .unwrap();

        let statuses = [
            PaymentStatus::Completed,
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Refunded,
        ];
        let payments: Vec<Payment> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let created_at = start + chrono::TimeDelta::minutes(i as i64 * 10);
                Payment {
                    id: uuid::Uuid::new_v4().to_string(),
                    amount: 1_250,
                    currency: "EUR".into(),
                    payment_method: PaymentMethod::ALL[i % PaymentMethod::ALL.len()],
                    status: *status,
                    paid_at: (*status != PaymentStatus::Pending).then_some(created_at),
                    event_id: event.id.clone(),
                    user_id: guest.id.clone(),
                    tenant_id: tenant.to_string(),
                    metadata: None,
                    created_at,
                }
            })
            .collect();
        self.store.create_payments(&payments).await.unwrap();
        (event.id, payments.len())
    }
}

async fn seeded_store() -> Store {
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
