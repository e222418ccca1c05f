mod events;
mod payments;
pub(crate) mod row_helpers;
mod seeds;
mod tenants;
mod users;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::SeedableRng;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::models::*;

pub use events::EventRepository;
pub use payments::PaymentRepository;

/// Typed "resource not found" error, downcast by the API error handler.
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// A row could not be removed because other rows still reference it
#[derive(Debug)]
pub struct InUseError {
    pub resource: String,
    pub id: String,
}

impl InUseError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for InUseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is still referenced: {}", self.resource, self.id)
    }
}

impl std::error::Error for InUseError {}

#[cfg(not(test))]
const PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const PASSWORD_COST: u32 = 4;

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database, kept alive by a single pinned connection
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ========== Tenant Operations ==========

    pub async fn get_tenant(&self, id: &str) -> Result<Option<Tenant>> {
        tenants::TenantRepo::get(&self.pool, id).await
    }

    pub async fn create_tenant(&self, id: &str, req: &CreateTenantRequest) -> Result<Tenant> {
        tenants::TenantRepo::create(&self.pool, id, req).await
    }

    pub async fn add_tenant_member(&self, tenant_id: &str, user_id: &str, role: &str) -> Result<()> {
        tenants::TenantRepo::add_member(&self.pool, tenant_id, user_id, role).await
    }

    pub async fn list_memberships(&self, user_id: &str) -> Result<Vec<TenantMembership>> {
        tenants::TenantRepo::memberships(&self.pool, user_id).await
    }

    // ========== User Operations ==========

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        users::UserRepo::get(&self.pool, id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        users::UserRepo::get_by_email(&self.pool, email).await
    }

    pub async fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        let id = uuid::Uuid::new_v4().to_string();
        users::UserRepo::create(&self.pool, &id, email, name, password_hash).await
    }

    // ========== Payment Operations ==========

    pub async fn create_payments(&self, payments: &[Payment]) -> Result<u64> {
        payments::PaymentRepo::create_many(&self.pool, payments).await
    }

    // ========== Demo Data ==========

    /// Seed a demo tenant with an owner, customers, events and payments.
    /// Does nothing once any tenant exists.
    pub async fn seed_demo_data(&self) -> Result<()> {
        if tenants::TenantRepo::count(&self.pool).await? > 0 {
            tracing::info!("Tenants already present, skipping demo data");
            return Ok(());
        }

        let tenant = self
            .create_tenant(
                &uuid::Uuid::new_v4().to_string(),
                &CreateTenantRequest {
                    name: seeds::DEMO_TENANT_NAME.to_string(),
                    slug: seeds::DEMO_TENANT_SLUG.to_string(),
                },
            )
            .await?;

        let password_hash = bcrypt::hash(seeds::DEMO_ADMIN_PASSWORD, PASSWORD_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash demo password: {}", e))?;
        let admin = self
            .create_user(seeds::DEMO_ADMIN_EMAIL, "Demo Admin", &password_hash)
            .await?;
        self.add_tenant_member(&tenant.id, &admin.id, tenant_role::OWNER).await?;

        let mut customer_ids = Vec::with_capacity(seeds::DEMO_CUSTOMER_COUNT);
        for n in 1..=seeds::DEMO_CUSTOMER_COUNT {
            let customer = self
                .create_user(&format!("guest{}@example.com", n), &format!("Guest {}", n), "")
                .await?;
            customer_ids.push(customer.id);
        }

        let mut rng = rand::rngs::StdRng::from_entropy();
        let plan = seeds::demo_plan(&mut rng, &tenant.id, &customer_ids, chrono::Utc::now())?;
        for event in &plan.events {
            events::EventRepo::create(&self.pool, event).await?;
        }
        let payment_count = self.create_payments(&plan.payments).await?;

        tracing::info!(
            "Seeded demo tenant '{}' ({} events, {} payments); login {} / {}",
            tenant.slug,
            plan.events.len(),
            payment_count,
            seeds::DEMO_ADMIN_EMAIL,
            seeds::DEMO_ADMIN_PASSWORD
        );
        Ok(())
    }
}

#[async_trait]
impl EventRepository for Store {
    async fn list(&self, tenant_id: &str, status: Option<&str>) -> Result<Vec<Event>> {
        events::EventRepo::list(&self.pool, tenant_id, status).await
    }

    async fn get(&self, tenant_id: &str, id: &str) -> Result<Option<Event>> {
        events::EventRepo::get(&self.pool, tenant_id, id).await
    }

    async fn create(&self, event: &Event) -> Result<Event> {
        events::EventRepo::create(&self.pool, event).await
    }

    async fn update(&self, event: &Event) -> Result<Event> {
        events::EventRepo::update(&self.pool, event).await
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> Result<()> {
        events::EventRepo::delete(&self.pool, tenant_id, id).await
    }
}

#[async_trait]
impl PaymentRepository for Store {
    async fn list_payments(&self, tenant_id: &str, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        payments::PaymentRepo::list(&self.pool, tenant_id, filter).await
    }
}
