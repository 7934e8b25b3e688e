//! Error type shared by handlers, services and storage.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::response::ApiResponse;
use crate::domain::aggregates::ProductError;
use crate::domain::discount::CouponRejection;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

impl StorefrontError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(message: impl std::fmt::Display) -> Self {
        Self::Validation(message.to_string())
    }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<ProductError> for StorefrontError {
    fn from(e: ProductError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Rejections at redemption time are conflicts with the coupon's current state.
impl From<CouponRejection> for StorefrontError {
    fn from(e: CouponRejection) -> Self {
        Self::Conflict(e.to_string())
    }
}

// Malformed requests are reported like any other validation failure.
impl From<JsonRejection> for StorefrontError {
    fn from(e: JsonRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<QueryRejection> for StorefrontError {
    fn from(e: QueryRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<PathRejection> for StorefrontError {
    fn from(e: PathRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<MultipartRejection> for StorefrontError {
    fn from(e: MultipartRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<std::io::Error> for StorefrontError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(StorefrontError::AuthenticationRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(StorefrontError::Forbidden("no".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(StorefrontError::NotFound("Product").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StorefrontError::Validation("bad".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(StorefrontError::from(CouponRejection::Exhausted).status_code(), StatusCode::CONFLICT);
        assert_eq!(StorefrontError::Internal("boom".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages() {
        assert_eq!(StorefrontError::AuthenticationRequired.to_string(), "Authentication required");
        assert_eq!(StorefrontError::NotFound("Coupon").to_string(), "Coupon not found");
    }
}
