//! Categories and the color palette.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::auth::SessionUser;
use crate::api::extract::{Path, Payload, Query};
use crate::api::response::{ApiResponse, ApiResult};
use crate::domain::catalog::{Category, Color};
use crate::domain::value_objects::Slug;
use crate::error::{Result, StorefrontError};
use crate::AppState;

pub async fn list_categories(State(s): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::ok(s.store.list_categories().await?))
}

pub async fn get_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Category> {
    let category = s.store.get_category(id).await?.ok_or(StorefrontError::NotFound("Category"))?;
    Ok(ApiResponse::ok(category))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

pub async fn create_category(_user: SessionUser, State(s): State<AppState>, Payload(r): Payload<CreateCategoryRequest>) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    r.validate()?;
    let slug = Slug::from_name(&r.name).ok_or_else(|| StorefrontError::Validation("name must contain letters or digits".into()))?;
    if let Some(parent) = r.parent_id {
        s.store.get_category(parent).await?.ok_or(StorefrontError::NotFound("Parent category"))?;
    }
    let category = Category {
        id: Uuid::now_v7(),
        name: r.name.trim().to_string(),
        slug: slug.into_inner(),
        description: r.description,
        parent_id: r.parent_id,
        created_at: Utc::now(),
    };
    s.store.insert_category(&category).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(category)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorParams {
    pub is_active: Option<bool>,
}

pub async fn list_colors(State(s): State<AppState>, Query(p): Query<ColorParams>) -> ApiResult<Vec<Color>> {
    Ok(ApiResponse::ok(s.store.list_colors(p.is_active).await?))
}
