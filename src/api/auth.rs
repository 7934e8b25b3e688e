//! Bearer-session authentication.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use uuid::Uuid;

use crate::error::StorefrontError;
use crate::AppState;

/// The user behind the request's `Authorization: Bearer <token>` session.
///
/// Rejects with `AuthenticationRequired` when the header is missing,
/// malformed, or names an unknown or expired session. Extract as
/// `Option<SessionUser>` where a session is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: Uuid,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(StorefrontError::AuthenticationRequired)?;
        let user_id = state
            .store
            .session_user(token, Utc::now())
            .await?
            .ok_or(StorefrontError::AuthenticationRequired)?;
        Ok(Self { user_id })
    }
}
