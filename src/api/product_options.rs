//! Colors and variants, managed as sub-resources of a product.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::auth::SessionUser;
use crate::api::extract::{Path, Payload};
use crate::api::money::amount;
use crate::api::products::{owned_product, visible_product};
use crate::api::response::{ApiResponse, ApiResult};
use crate::domain::aggregates::{ProductColor, ProductVariant};
use crate::domain::catalog::is_hex_color;
use crate::error::{Result, StorefrontError};
use crate::AppState;

fn hex_color(value: &str) -> std::result::Result<(), ValidationError> {
    if is_hex_color(value) { Ok(()) } else { Err(ValidationError::new("hex_color")) }
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ColorRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(custom = "hex_color")]
    pub hex_code: String,
    #[validate(custom = "amount")]
    #[serde(default)]
    pub price_adjustment: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ColorRequest {
    fn into_color(self, id: Uuid, product_id: Uuid) -> Result<ProductColor> {
        self.validate()?;
        Ok(ProductColor {
            id,
            product_id,
            name: self.name.trim().to_string(),
            hex_code: self.hex_code.to_uppercase(),
            price_adjustment: self.price_adjustment,
            stock_quantity: self.stock_quantity,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantRequest {
    #[validate(length(min = 1, max = 50))]
    pub variant_name: String,
    #[validate(length(min = 1, max = 50))]
    pub variant_value: String,
    #[validate(custom = "amount")]
    #[serde(default)]
    pub price_adjustment: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
}

impl VariantRequest {
    fn into_variant(self, id: Uuid, product_id: Uuid) -> Result<ProductVariant> {
        self.validate()?;
        Ok(ProductVariant {
            id,
            product_id,
            variant_name: self.variant_name.trim().to_string(),
            variant_value: self.variant_value.trim().to_string(),
            price_adjustment: self.price_adjustment,
            stock_quantity: self.stock_quantity,
        })
    }
}

// Colors

pub async fn list_colors(viewer: Option<SessionUser>, State(s): State<AppState>, Path(product_id): Path<Uuid>) -> ApiResult<Vec<ProductColor>> {
    Ok(ApiResponse::ok(visible_product(&s, product_id, viewer).await?.colors))
}

pub async fn create_color(user: SessionUser, State(s): State<AppState>, Path(product_id): Path<Uuid>, Payload(r): Payload<ColorRequest>) -> Result<(StatusCode, Json<ApiResponse<ProductColor>>)> {
    owned_product(&s, product_id, user).await?;
    let color = r.into_color(Uuid::now_v7(), product_id)?;
    s.store.insert_color(&color).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(color)))
}

pub async fn update_color(user: SessionUser, State(s): State<AppState>, Path((product_id, color_id)): Path<(Uuid, Uuid)>, Payload(r): Payload<ColorRequest>) -> ApiResult<ProductColor> {
    owned_product(&s, product_id, user).await?;
    let color = r.into_color(color_id, product_id)?;
    if !s.store.update_color(&color).await? {
        return Err(StorefrontError::NotFound("Color"));
    }
    Ok(ApiResponse::ok(color))
}

pub async fn delete_color(user: SessionUser, State(s): State<AppState>, Path((product_id, color_id)): Path<(Uuid, Uuid)>) -> ApiResult<Uuid> {
    owned_product(&s, product_id, user).await?;
    if !s.store.delete_color(product_id, color_id).await? {
        return Err(StorefrontError::NotFound("Color"));
    }
    Ok(ApiResponse::ok(color_id))
}

// Variants

pub async fn list_variants(viewer: Option<SessionUser>, State(s): State<AppState>, Path(product_id): Path<Uuid>) -> ApiResult<Vec<ProductVariant>> {
    Ok(ApiResponse::ok(visible_product(&s, product_id, viewer).await?.variants))
}

pub async fn create_variant(user: SessionUser, State(s): State<AppState>, Path(product_id): Path<Uuid>, Payload(r): Payload<VariantRequest>) -> Result<(StatusCode, Json<ApiResponse<ProductVariant>>)> {
    let product = owned_product(&s, product_id, user).await?;
    let variant = r.into_variant(Uuid::now_v7(), product_id)?;
    if product.variants.iter().any(|v| v.variant_name == variant.variant_name && v.variant_value == variant.variant_value) {
        return Err(StorefrontError::Conflict(format!("variant {}={} already exists", variant.variant_name, variant.variant_value)));
    }
    s.store.insert_variant(&variant).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(variant)))
}

pub async fn update_variant(user: SessionUser, State(s): State<AppState>, Path((product_id, variant_id)): Path<(Uuid, Uuid)>, Payload(r): Payload<VariantRequest>) -> ApiResult<ProductVariant> {
    owned_product(&s, product_id, user).await?;
    let variant = r.into_variant(variant_id, product_id)?;
    if !s.store.update_variant(&variant).await? {
        return Err(StorefrontError::NotFound("Variant"));
    }
    Ok(ApiResponse::ok(variant))
}

pub async fn delete_variant(user: SessionUser, State(s): State<AppState>, Path((product_id, variant_id)): Path<(Uuid, Uuid)>) -> ApiResult<Uuid> {
    owned_product(&s, product_id, user).await?;
    if !s.store.delete_variant(product_id, variant_id).await? {
        return Err(StorefrontError::NotFound("Variant"));
    }
    Ok(ApiResponse::ok(variant_id))
}
