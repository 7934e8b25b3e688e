//! Shop profile lookups and owner updates.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::auth::SessionUser;
use crate::api::extract::{Path, Payload};
use crate::api::response::{ApiResponse, ApiResult};
use crate::domain::shop::{ShopDetails, ShopProfile};
use crate::domain::value_objects::Username;
use crate::error::StorefrontError;
use crate::AppState;

const NOT_FOUND: StorefrontError = StorefrontError::NotFound("Shop profile");

pub async fn by_username(State(s): State<AppState>, Path(username): Path<String>) -> ApiResult<ShopProfile> {
    Ok(ApiResponse::ok(s.store.find_shop_by_username(&username).await?.ok_or(NOT_FOUND)?))
}

pub async fn by_id(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<ShopProfile> {
    Ok(ApiResponse::ok(s.store.find_shop_by_id(id).await?.ok_or(NOT_FOUND)?))
}

pub async fn by_user(State(s): State<AppState>, Path(user_id): Path<Uuid>) -> ApiResult<ShopProfile> {
    Ok(ApiResponse::ok(s.store.find_shop_by_user(user_id).await?.ok_or(NOT_FOUND)?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShopProfileRequest {
    pub username: String,
    #[validate(length(min = 1, max = 100))]
    pub shop_name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub banner_url: Option<String>,
}

/// Creates or updates the caller's own shop profile.
pub async fn save_own(user: SessionUser, State(s): State<AppState>, Payload(r): Payload<ShopProfileRequest>) -> ApiResult<ShopProfile> {
    r.validate()?;
    let username = Username::new(&r.username).map_err(StorefrontError::validation)?;
    let existing = s.store.find_shop_by_user(user.user_id).await?;
    let details = ShopDetails {
        username,
        shop_name: r.shop_name.trim().to_string(),
        description: r.description,
        logo_url: r.logo_url,
        banner_url: r.banner_url,
    };
    let profile = ShopProfile::upsert(existing, user.user_id, details);
    s.store.save_shop(&profile).await?;
    tracing::info!(shop_id = %profile.id, user_id = %user.user_id, username = %profile.username, "shop profile saved");
    Ok(ApiResponse::ok(profile))
}
