//! `AuthUser` extractor: verifies the caller's access token and injects
//! the request context.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use classhub_auth::JwtDecoder;
use classhub_core::error::AppError;
use classhub_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// `?token=` query parameter.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match parts.headers.get("authorization") {
            Some(value) => {
                let header = value
                    .to_str()
                    .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;
                header
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?
                    .to_string()
            }
            // Beacon requests cannot set headers.
            None => Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|q| q.0.token)
                .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?,
        };

        Ok(AuthUser(authenticate(&state.jwt_decoder, &token)?))
    }
}

/// Verify an access token and build the caller's context.
pub fn authenticate(decoder: &JwtDecoder, token: &str) -> Result<RequestContext, AppError> {
    let claims = decoder.decode_access_token(token)?;
    Ok(RequestContext::new(claims.user_id(), claims.role, claims.name))
}
