use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::handlers::{ApiError, ErrorCode};
use crate::models::Claims;
use crate::AppState;

/// Extractor that validates JWT and provides the authenticated user's claims.
///
/// Add `_auth: AuthUser` to a handler's parameters to require authentication.
pub struct AuthUser {
    pub claims: Claims,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AuthError::MissingToken
                    } else {
                        AuthError::InvalidToken
                    }
                })?;

        let claims = decode_token(bearer.token(), &state.config.jwt_secret)
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser { claims })
    }
}

/// Sign `claims` with the shared HS256 secret
pub fn issue_token(claims: &Claims, secret: &str) -> jsonwebtoken::errors::Result<String> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> jsonwebtoken::errors::Result<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .map(|data| data.claims)
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = match err {
            AuthError::MissingToken => "Missing authentication token",
            AuthError::InvalidToken => "Invalid or expired token",
        };
        ApiError::unauthorized(ErrorCode::Unauthorized, message)
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        ApiError::from(self).into_response()
    }
}

/// The tenant the caller acts for, resolved from the `tenant_id` claim.
///
/// A valid token without a tenant is rejected with 403 `TENANT_REQUIRED`.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: String,
    pub user_id: String,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let tenant_id = auth
            .claims
            .tenant_id
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::forbidden(ErrorCode::TenantRequired, "No tenant associated with this session")
            })?;

        Ok(TenantContext {
            tenant_id,
            user_id: auth.claims.sub,
        })
    }
}
