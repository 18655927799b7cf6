use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::state::AppState;

/// Proof that the caller presented the configured admin bearer token.
///
/// With no `ADMIN_API_TOKEN` configured the admin routes are open; strict
/// config refuses to start in that state.
pub(crate) struct AdminAccess;

#[async_trait]
impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let Some(expected) = app_state.settings().admin().api_token.as_deref() else {
            return Ok(AdminAccess);
        };

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Admin token required".to_string()))?;

        if token != expected {
            tracing::warn!("Rejected admin request with invalid token");
            return Err(ApiError::Unauthorized("Invalid admin token".to_string()));
        }

        Ok(AdminAccess)
    }
}
