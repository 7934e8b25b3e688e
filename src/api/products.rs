//! Product catalog and management endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::auth::SessionUser;
use crate::api::extract::{Path, Payload, Query};
use crate::api::money::non_negative_amount;
use crate::api::response::{ApiResponse, ApiResult, PageParams, Paginated};
use crate::domain::aggregates::{Product, ProductDetails, ProductStatus};
use crate::domain::pricing::{PriceQuote, PriceSelection};
use crate::domain::value_objects::Sku;
use crate::error::{Result, StorefrontError};
use crate::storage::ProductQuery;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
    /// Owner listings only.
    pub status: Option<ProductStatus>,
}

impl ListParams {
    fn query(&self, status: Option<ProductStatus>, owner_id: Option<Uuid>) -> (ProductQuery, PageParams) {
        let pages = PageParams { page: self.page, per_page: self.per_page };
        let (limit, offset) = pages.limit_offset();
        let query = ProductQuery {
            status,
            owner_id,
            category_id: self.category,
            search: self.search.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            limit,
            offset,
        };
        (query, pages)
    }
}

async fn list_page(s: &AppState, query: ProductQuery, pages: PageParams) -> ApiResult<Paginated<Product>> {
    let (items, total) = s.store.list_products(&query).await?;
    let (page, per_page) = pages.resolve();
    Ok(ApiResponse::ok(Paginated { items, total, page, per_page }))
}

/// Published products only.
pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Paginated<Product>> {
    let (query, pages) = p.query(Some(ProductStatus::Active), None);
    list_page(&s, query, pages).await
}

/// The caller's own products in every status, for the dashboard.
pub async fn list_my_products(user: SessionUser, State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Paginated<Product>> {
    let (query, pages) = p.query(p.status, Some(user.user_id));
    list_page(&s, query, pages).await
}

/// Loads a product visible to `viewer`: published products to anyone,
/// drafts and archived products only to their owner.
pub(crate) async fn visible_product(s: &AppState, id: Uuid, viewer: Option<SessionUser>) -> Result<Product> {
    let product = s.store.get_product(id).await?.ok_or(StorefrontError::NotFound("Product"))?;
    let is_owner = viewer.map_or(false, |u| product.is_owned_by(u.user_id));
    if product.is_public() || is_owner { Ok(product) } else { Err(StorefrontError::NotFound("Product")) }
}

/// Loads a product for modification by `user`.
pub(crate) async fn owned_product(s: &AppState, id: Uuid, user: SessionUser) -> Result<Product> {
    let product = s.store.get_product(id).await?.ok_or(StorefrontError::NotFound("Product"))?;
    if !product.is_owned_by(user.user_id) {
        return Err(StorefrontError::Forbidden("You do not own this product".into()));
    }
    Ok(product)
}

pub async fn get_product(viewer: Option<SessionUser>, State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Product> {
    Ok(ApiResponse::ok(visible_product(&s, id, viewer).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(custom = "non_negative_amount")]
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
    /// Generated when absent. Ignored on update.
    pub sku: Option<String>,
}

impl ProductRequest {
    fn details(&self) -> Result<ProductDetails> {
        self.validate()?;
        if self.name.trim().is_empty() {
            return Err(StorefrontError::Validation("name is required".into()));
        }
        let mut tags: Vec<String> = self.tags.iter().map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()).collect();
        tags.sort();
        tags.dedup();
        Ok(ProductDetails {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            price: self.price,
            category_id: self.category_id,
            tags,
            stock_quantity: self.stock_quantity,
        })
    }
}

async fn ensure_category(s: &AppState, category_id: Option<Uuid>) -> Result<()> {
    if let Some(id) = category_id {
        s.store.get_category(id).await?.ok_or(StorefrontError::NotFound("Category"))?;
    }
    Ok(())
}

pub async fn create_product(user: SessionUser, State(s): State<AppState>, Payload(r): Payload<ProductRequest>) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    let details = r.details()?;
    ensure_category(&s, details.category_id).await?;
    let sku = match r.sku.as_deref() {
        Some(raw) => Sku::new(raw).map_err(StorefrontError::validation)?,
        None => Sku::generate(),
    };
    let mut product = Product::create(user.user_id, sku, details);
    s.store.insert_product(&product).await?;
    tracing::info!(product_id = %product.id, owner_id = %user.user_id, sku = %product.sku, "product draft created");
    s.events.publish(product.take_events()).await;
    Ok((StatusCode::CREATED, ApiResponse::ok(product)))
}

pub async fn update_product(user: SessionUser, State(s): State<AppState>, Path(id): Path<Uuid>, Payload(r): Payload<ProductRequest>) -> ApiResult<Product> {
    let details = r.details()?;
    let mut product = owned_product(&s, id, user).await?;
    ensure_category(&s, details.category_id).await?;
    product.update_details(details);
    s.store.update_product(&product).await?;
    Ok(ApiResponse::ok(product))
}

/// Soft delete: the product is archived and disappears from listings.
pub async fn delete_product(user: SessionUser, State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Product> {
    let mut product = owned_product(&s, id, user).await?;
    product.archive();
    s.store.update_product(&product).await?;
    tracing::info!(product_id = %id, "product archived");
    s.events.publish(product.take_events()).await;
    Ok(ApiResponse::ok(product))
}

pub async fn publish_product(user: SessionUser, State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Product> {
    let mut product = owned_product(&s, id, user).await?;
    product.publish()?;
    s.store.update_product(&product).await?;
    tracing::info!(product_id = %id, "product published");
    s.events.publish(product.take_events()).await;
    Ok(ApiResponse::ok(product))
}

/// Effective price for a color and variant selection.
pub async fn quote_price(viewer: Option<SessionUser>, State(s): State<AppState>, Path(id): Path<Uuid>, Payload(selection): Payload<PriceSelection>) -> ApiResult<PriceQuote> {
    let product = visible_product(&s, id, viewer).await?;
    Ok(ApiResponse::ok(product.quote(&selection)))
}
