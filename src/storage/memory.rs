//! In-process store used by tests and local experiments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, DiscountStore, ProductQuery, ProductStore, ReviewQuery, ReviewStore, SessionStore, ShopStore};
use crate::domain::aggregates::{Product, ProductColor, ProductImage, ProductVariant};
use crate::domain::catalog::{Category, Color};
use crate::domain::discount::{Coupon, Discount, DiscountStatus};
use crate::domain::review::{Review, ReviewType};
use crate::domain::shop::ShopProfile;
use crate::error::{Result, StorefrontError};

#[derive(Default)]
struct State {
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    products: HashMap<Uuid, Product>,
    categories: Vec<Category>,
    colors: Vec<Color>,
    discounts: Vec<Discount>,
    coupons: Vec<Coupon>,
    redemptions: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    reviews: Vec<Review>,
    shops: Vec<ShopProfile>,
}

impl State {
    fn product_mut(&mut self, id: Uuid) -> Result<&mut Product> {
        self.products.get_mut(&id).ok_or(StorefrontError::NotFound("Product"))
    }

    fn redemptions_by(&self, coupon_id: Uuid, user_id: Uuid) -> i64 {
        self.redemptions.iter().filter(|(c, u, _)| *c == coupon_id && *u == user_id).count() as i64
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    failing_coupon_lookups: RwLock<Vec<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_session(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) {
        self.state.write().await.sessions.insert(token.to_string(), (user_id, expires_at));
    }

    /// Palette colors have no write endpoint; they are provisioned out of band.
    pub async fn add_palette_color(&self, color: Color) {
        self.state.write().await.colors.push(color);
    }

    /// Makes coupon lookups for `discount_id` fail with a storage error.
    pub async fn fail_coupon_lookups_for(&self, discount_id: Uuid) {
        self.failing_coupon_lookups.write().await.push(discount_id);
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        let state = self.state.read().await;
        Ok(state.sessions.get(token).filter(|(_, expires)| *expires > now).map(|(user, _)| *user))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self, q: &ProductQuery) -> Result<(Vec<Product>, i64)> {
        let state = self.state.read().await;
        let needle = q.search.as_ref().map(|s| s.to_lowercase());
        let mut matches: Vec<&Product> = state
            .products
            .values()
            .filter(|p| q.status.map_or(true, |s| p.status == s))
            .filter(|p| q.owner_id.map_or(true, |o| p.owner_id == o))
            .filter(|p| q.category_id.map_or(true, |c| p.category_id == Some(c)))
            .filter(|p| needle.as_ref().map_or(true, |n| p.name.to_lowercase().contains(n)))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(q.offset.max(0) as usize)
            .take(q.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write().await;
        if state.products.values().any(|p| p.sku == product.sku) {
            return Err(StorefrontError::Conflict("SKU already in use".into()));
        }
        let mut stored = product.clone();
        stored.events.clear();
        state.products.insert(product.id, stored);
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write().await;
        let stored = state.product_mut(product.id)?;
        let (variants, colors, images) = (
            std::mem::take(&mut stored.variants),
            std::mem::take(&mut stored.colors),
            std::mem::take(&mut stored.images),
        );
        *stored = Product { variants, colors, images, events: vec![], ..product.clone() };
        Ok(())
    }

    async fn insert_variant(&self, variant: &ProductVariant) -> Result<()> {
        let mut state = self.state.write().await;
        state.product_mut(variant.product_id)?.variants.push(variant.clone());
        Ok(())
    }

    async fn update_variant(&self, variant: &ProductVariant) -> Result<bool> {
        let mut state = self.state.write().await;
        let product = state.product_mut(variant.product_id)?;
        match product.variants.iter_mut().find(|v| v.id == variant.id) {
            Some(existing) => { *existing = variant.clone(); Ok(true) }
            None => Ok(false),
        }
    }

    async fn delete_variant(&self, product_id: Uuid, variant_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let product = state.product_mut(product_id)?;
        let before = product.variants.len();
        product.variants.retain(|v| v.id != variant_id);
        Ok(product.variants.len() != before)
    }

    async fn insert_color(&self, color: &ProductColor) -> Result<()> {
        let mut state = self.state.write().await;
        state.product_mut(color.product_id)?.colors.push(color.clone());
        Ok(())
    }

    async fn update_color(&self, color: &ProductColor) -> Result<bool> {
        let mut state = self.state.write().await;
        let product = state.product_mut(color.product_id)?;
        match product.colors.iter_mut().find(|c| c.id == color.id) {
            Some(existing) => { *existing = color.clone(); Ok(true) }
            None => Ok(false),
        }
    }

    async fn delete_color(&self, product_id: Uuid, color_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let product = state.product_mut(product_id)?;
        let before = product.colors.len();
        product.colors.retain(|c| c.id != color_id);
        Ok(product.colors.len() != before)
    }

    async fn insert_image(&self, image: &ProductImage) -> Result<()> {
        let mut state = self.state.write().await;
        state.product_mut(image.product_id)?.images.push(image.clone());
        Ok(())
    }

    async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<Option<ProductImage>> {
        let mut state = self.state.write().await;
        let product = state.product_mut(product_id)?;
        let index = product.images.iter().position(|i| i.id == image_id);
        Ok(index.map(|i| product.images.remove(i)))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.state.read().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_category(&self, category: &Category) -> Result<()> {
        let mut state = self.state.write().await;
        if state.categories.iter().any(|c| c.slug == category.slug) {
            return Err(StorefrontError::Conflict("Category slug already in use".into()));
        }
        state.categories.push(category.clone());
        Ok(())
    }

    async fn list_colors(&self, is_active: Option<bool>) -> Result<Vec<Color>> {
        let state = self.state.read().await;
        let mut colors: Vec<Color> = state.colors.iter().filter(|c| is_active.map_or(true, |a| c.is_active == a)).cloned().collect();
        colors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(colors)
    }
}

#[async_trait]
impl DiscountStore for MemoryStore {
    async fn list_active_discounts(&self, now: DateTime<Utc>) -> Result<Vec<Discount>> {
        let state = self.state.read().await;
        Ok(state
            .discounts
            .iter()
            .filter(|d| d.status == DiscountStatus::Active && d.start_date <= now && now <= d.end_date)
            .cloned()
            .collect())
    }

    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>> {
        Ok(self.state.read().await.discounts.iter().find(|d| d.id == id).cloned())
    }

    async fn insert_discount(&self, discount: &Discount) -> Result<()> {
        self.state.write().await.discounts.push(discount.clone());
        Ok(())
    }

    async fn list_coupons(&self, discount_id: Uuid) -> Result<Vec<Coupon>> {
        if self.failing_coupon_lookups.read().await.contains(&discount_id) {
            return Err(StorefrontError::Storage(sqlx::Error::PoolTimedOut));
        }
        let state = self.state.read().await;
        Ok(state.coupons.iter().filter(|c| c.discount_id == discount_id).cloned().collect())
    }

    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        Ok(self.state.read().await.coupons.iter().find(|c| c.code == code).cloned())
    }

    async fn insert_coupon(&self, coupon: &Coupon) -> Result<()> {
        let mut state = self.state.write().await;
        if state.coupons.iter().any(|c| c.code == coupon.code) {
            return Err(StorefrontError::Conflict("Coupon code already in use".into()));
        }
        state.coupons.push(coupon.clone());
        Ok(())
    }

    async fn count_redemptions(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64> {
        Ok(self.state.read().await.redemptions_by(coupon_id, user_id))
    }

    async fn redeem_coupon(&self, coupon_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Result<Coupon> {
        let mut state = self.state.write().await;
        let used_by_user = state.redemptions_by(coupon_id, user_id);
        let coupon = state
            .coupons
            .iter_mut()
            .find(|c| c.id == coupon_id)
            .ok_or(StorefrontError::NotFound("Coupon"))?;
        coupon.check(used_by_user, now)?;
        coupon.used_count += 1;
        let redeemed = coupon.clone();
        state.redemptions.push((coupon_id, user_id, now));
        Ok(redeemed)
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn list_reviews(&self, q: &ReviewQuery) -> Result<(Vec<Review>, i64)> {
        let state = self.state.read().await;
        let mut matches: Vec<&Review> = state
            .reviews
            .iter()
            .filter(|r| q.review_type.map_or(true, |t| r.review_type == t))
            .filter(|r| q.target_id.map_or(true, |t| r.target_id == t))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matches.len() as i64;
        let page = matches.into_iter().skip(q.offset.max(0) as usize).take(q.limit.max(0) as usize).cloned().collect();
        Ok((page, total))
    }

    async fn rating_totals(&self, review_type: ReviewType, target_id: Uuid) -> Result<(i64, i64)> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.review_type == review_type && r.target_id == target_id)
            .fold((0, 0), |(sum, count), r| (sum + i64::from(r.rating.value()), count + 1)))
    }

    async fn insert_review(&self, review: &Review) -> Result<()> {
        self.state.write().await.reviews.push(review.clone());
        Ok(())
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn find_shop_by_username(&self, username: &str) -> Result<Option<ShopProfile>> {
        let username = username.to_ascii_lowercase();
        Ok(self.state.read().await.shops.iter().find(|s| s.username.as_str() == username).cloned())
    }

    async fn find_shop_by_id(&self, id: Uuid) -> Result<Option<ShopProfile>> {
        Ok(self.state.read().await.shops.iter().find(|s| s.id == id).cloned())
    }

    async fn find_shop_by_user(&self, user_id: Uuid) -> Result<Option<ShopProfile>> {
        Ok(self.state.read().await.shops.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn save_shop(&self, profile: &ShopProfile) -> Result<()> {
        let mut state = self.state.write().await;
        if state.shops.iter().any(|s| s.username == profile.username && s.id != profile.id) {
            return Err(StorefrontError::Conflict("Username already taken".into()));
        }
        match state.shops.iter_mut().find(|s| s.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => state.shops.push(profile.clone()),
        }
        Ok(())
    }
}
