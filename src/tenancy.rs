//! Tenant-scoped repository handles.
//!
//! Handlers never pass a tenant id to persistence themselves: they take a
//! [`TenantEvents`] or [`TenantPayments`] extractor, which resolves the
//! caller's tenant once and binds it into every repository call.

use anyhow::Result;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::auth::TenantContext;
use crate::db::{EventRepository, PaymentRepository};
use crate::handlers::ApiError;
use crate::models::*;
use crate::AppState;

/// Event repository bound to the caller's tenant
pub struct TenantEvents {
    tenant: TenantContext,
    repo: Arc<dyn EventRepository>,
}

impl TenantEvents {
    pub fn new(tenant: TenantContext, repo: Arc<dyn EventRepository>) -> Self {
        Self { tenant, repo }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant.tenant_id
    }

    pub fn user_id(&self) -> &str {
        &self.tenant.user_id
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Event>> {
        self.repo.list(self.tenant_id(), status).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<Event>> {
        self.repo.get(self.tenant_id(), id).await
    }

    /// Persist a new event; its owner is always the scoped tenant
    pub async fn create(&self, mut event: Event) -> Result<Event> {
        event.tenant_id = self.tenant_id().to_string();
        self.repo.create(&event).await
    }

    /// Persist changes to an event owned by the scoped tenant
    pub async fn save(&self, mut event: Event) -> Result<Event> {
        event.tenant_id = self.tenant_id().to_string();
        self.repo.update(&event).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repo.delete(self.tenant_id(), id).await
    }
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for TenantEvents {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let tenant = TenantContext::from_request_parts(parts, state).await?;
        Ok(Self::new(tenant, state.events.clone()))
    }
}

/// Payment repository bound to the caller's tenant
pub struct TenantPayments {
    tenant: TenantContext,
    repo: Arc<dyn PaymentRepository>,
}

impl TenantPayments {
    pub async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        self.repo.list_payments(&self.tenant.tenant_id, filter).await
    }
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for TenantPayments {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let tenant = TenantContext::from_request_parts(parts, state).await?;
        Ok(Self {
            tenant,
            repo: state.payments.clone(),
        })
    }
}
