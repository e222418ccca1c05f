use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{issue_token, AuthUser};
use crate::models::{Claims, LoginRequest, LoginResponse, Tenant, User};
use crate::AppState;

use super::{ok, ApiError, ApiJson, ApiResponse, ErrorCode};

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized(ErrorCode::InvalidCredentials, "Invalid email or password")
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request(
            ErrorCode::ValidationError,
            "email and password are required",
        ));
    }

    let user = state
        .store
        .get_user_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    // End users created without a password cannot sign in to the dashboard
    if user.password_hash.is_empty() {
        return Err(invalid_credentials());
    }

    let valid = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| anyhow::anyhow!("password verification error: {}", e))?;
    if !valid {
        return Err(invalid_credentials());
    }

    let memberships = state.store.list_memberships(&user.id).await?;
    let membership = match req.tenant_id.as_deref().filter(|t| !t.is_empty()) {
        Some(requested) => Some(
            memberships
                .into_iter()
                .find(|m| m.tenant_id == requested)
                .ok_or_else(|| {
                    ApiError::forbidden(
                        ErrorCode::TenantAccessDenied,
                        "User is not a member of this tenant",
                    )
                })?,
        ),
        None => memberships.into_iter().next(),
    };

    let now = chrono::Utc::now();
    let exp = now + chrono::TimeDelta::hours(state.config.jwt_ttl_hours);
    let tenant_id = membership.as_ref().map(|m| m.tenant_id.clone());
    let role = membership.map(|m| m.role);

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        tenant_id: tenant_id.clone(),
        role: role.clone(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = issue_token(&claims, &state.config.jwt_secret)
        .map_err(|e| anyhow::anyhow!("token generation error: {}", e))?;

    tracing::info!(user_id = %user.id, tenant_id = ?tenant_id, "User logged in");

    Ok(ok(LoginResponse {
        token,
        user,
        tenant_id,
        role,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: User,
    pub tenant: Option<Tenant>,
    pub role: Option<String>,
}

/// GET /api/auth/me
pub async fn me(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SessionInfo>>, ApiError> {
    let user = state
        .store
        .get_user(&auth.claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized(ErrorCode::Unauthorized, "User no longer exists"))?;

    let tenant = match auth.claims.tenant_id.as_deref() {
        Some(id) => state.store.get_tenant(id).await?,
        None => None,
    };

    Ok(ok(SessionInfo {
        user,
        tenant,
        role: auth.claims.role,
    }))
}
