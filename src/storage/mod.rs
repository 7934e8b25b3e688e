//! Persistence ports.
//!
//! Handlers and services only see these traits. [`PgStore`] backs the running
//! service; [`MemoryStore`] keeps everything in process and backs the tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::aggregates::{Product, ProductColor, ProductImage, ProductStatus, ProductVariant};
use crate::domain::catalog::{Category, Color};
use crate::domain::discount::{Coupon, Discount};
use crate::domain::review::{Review, ReviewType};
use crate::domain::shop::ShopProfile;
use crate::error::Result;

/// Filters for product listings. `None` means "any".
#[derive(Clone, Debug, Default)]
pub struct ProductQuery {
    pub status: Option<ProductStatus>,
    pub owner_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone, Debug)]
pub struct ReviewQuery {
    pub review_type: Option<ReviewType>,
    pub target_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// User behind an unexpired session token.
    async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Matching products, newest first, with the total match count.
    async fn list_products(&self, query: &ProductQuery) -> Result<(Vec<Product>, i64)>;
    /// A product with its variants, colors and images loaded.
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn insert_product(&self, product: &Product) -> Result<()>;
    /// Persists the product's own fields; sub-resources are untouched.
    async fn update_product(&self, product: &Product) -> Result<()>;

    async fn insert_variant(&self, variant: &ProductVariant) -> Result<()>;
    /// `false` when no variant with that id belongs to the product.
    async fn update_variant(&self, variant: &ProductVariant) -> Result<bool>;
    async fn delete_variant(&self, product_id: Uuid, variant_id: Uuid) -> Result<bool>;

    async fn insert_color(&self, color: &ProductColor) -> Result<()>;
    async fn update_color(&self, color: &ProductColor) -> Result<bool>;
    async fn delete_color(&self, product_id: Uuid, color_id: Uuid) -> Result<bool>;

    async fn insert_image(&self, image: &ProductImage) -> Result<()>;
    /// The removed image, so its file can be cleaned up.
    async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<Option<ProductImage>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>>;
    /// Conflict when the slug is taken.
    async fn insert_category(&self, category: &Category) -> Result<()>;
    async fn list_colors(&self, is_active: Option<bool>) -> Result<Vec<Color>>;
}

#[async_trait]
pub trait DiscountStore: Send + Sync {
    /// Discounts with active status whose date window contains `now`.
    async fn list_active_discounts(&self, now: DateTime<Utc>) -> Result<Vec<Discount>>;
    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>>;
    async fn insert_discount(&self, discount: &Discount) -> Result<()>;

    async fn list_coupons(&self, discount_id: Uuid) -> Result<Vec<Coupon>>;
    /// Lookup by normalized (upper-case) code.
    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>>;
    /// Conflict when the code is taken.
    async fn insert_coupon(&self, coupon: &Coupon) -> Result<()>;
    async fn count_redemptions(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64>;
    /// Atomically re-checks the coupon for `user_id`, increments its use
    /// count and records the redemption. Fails with the coupon's rejection
    /// reason, leaving the count unchanged, when it is no longer usable.
    async fn redeem_coupon(&self, coupon_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Result<Coupon>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Matching reviews, newest first, with the total match count.
    async fn list_reviews(&self, query: &ReviewQuery) -> Result<(Vec<Review>, i64)>;
    /// `(sum of ratings, number of reviews)` for one target.
    async fn rating_totals(&self, review_type: ReviewType, target_id: Uuid) -> Result<(i64, i64)>;
    async fn insert_review(&self, review: &Review) -> Result<()>;
}

#[async_trait]
pub trait ShopStore: Send + Sync {
    async fn find_shop_by_username(&self, username: &str) -> Result<Option<ShopProfile>>;
    async fn find_shop_by_id(&self, id: Uuid) -> Result<Option<ShopProfile>>;
    async fn find_shop_by_user(&self, user_id: Uuid) -> Result<Option<ShopProfile>>;
    /// Insert or replace by id. Conflict when the username belongs to another shop.
    async fn save_shop(&self, profile: &ShopProfile) -> Result<()>;
}

/// Everything the service needs from persistence.
pub trait Store: SessionStore + ProductStore + CatalogStore + DiscountStore + ReviewStore + ShopStore {}

impl<T> Store for T where T: SessionStore + ProductStore + CatalogStore + DiscountStore + ReviewStore + ShopStore {}
