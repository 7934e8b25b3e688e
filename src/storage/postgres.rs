//! Postgres-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use super::{CatalogStore, DiscountStore, ProductQuery, ProductStore, ReviewQuery, ReviewStore, SessionStore, ShopStore};
use crate::domain::aggregates::{Product, ProductColor, ProductImage, ProductVariant};
use crate::domain::catalog::{Category, Color};
use crate::domain::discount::{Coupon, CouponRejection, Discount};
use crate::domain::review::{Review, ReviewType};
use crate::domain::shop::ShopProfile;
use crate::domain::value_objects::{Rating, Sku, Username};
use crate::domain::ParseEnumError;
use crate::error::{Result, StorefrontError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn label<T: FromStr<Err = ParseEnumError>>(raw: &str) -> Result<T> {
    raw.parse().map_err(|e: ParseEnumError| StorefrontError::Internal(e.to_string()))
}

fn conflict_on_unique(e: sqlx::Error, message: &str) -> StorefrontError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorefrontError::Conflict(message.to_string()),
        _ => e.into(),
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid, owner_id: Uuid, sku: String, name: String, description: Option<String>, price: Decimal,
    category_id: Option<Uuid>, tags: Vec<String>, stock_quantity: i32, status: String,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product> {
        Ok(Product {
            id: self.id,
            owner_id: self.owner_id,
            sku: Sku::new(self.sku).map_err(|e| StorefrontError::Internal(e.to_string()))?,
            name: self.name,
            description: self.description,
            price: self.price,
            category_id: self.category_id,
            tags: self.tags,
            stock_quantity: self.stock_quantity,
            status: label(&self.status)?,
            variants: vec![],
            colors: vec![],
            images: vec![],
            created_at: self.created_at,
            updated_at: self.updated_at,
            events: vec![],
        })
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow { id: Uuid, product_id: Uuid, variant_name: String, variant_value: String, price_adjustment: Decimal, stock_quantity: i32 }

impl From<VariantRow> for ProductVariant {
    fn from(r: VariantRow) -> Self {
        Self { id: r.id, product_id: r.product_id, variant_name: r.variant_name, variant_value: r.variant_value, price_adjustment: r.price_adjustment, stock_quantity: r.stock_quantity }
    }
}

#[derive(sqlx::FromRow)]
struct ColorRow { id: Uuid, product_id: Uuid, name: String, hex_code: String, price_adjustment: Decimal, stock_quantity: i32, is_active: bool }

impl From<ColorRow> for ProductColor {
    fn from(r: ColorRow) -> Self {
        Self { id: r.id, product_id: r.product_id, name: r.name, hex_code: r.hex_code, price_adjustment: r.price_adjustment, stock_quantity: r.stock_quantity, is_active: r.is_active }
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow { id: Uuid, product_id: Uuid, url: String, alt_text: Option<String>, position: i32, created_at: DateTime<Utc> }

impl From<ImageRow> for ProductImage {
    fn from(r: ImageRow) -> Self {
        Self { id: r.id, product_id: r.product_id, url: r.url, alt_text: r.alt_text, position: r.position, created_at: r.created_at }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow { id: Uuid, name: String, slug: String, description: Option<String>, parent_id: Option<Uuid>, created_at: DateTime<Utc> }

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Self { id: r.id, name: r.name, slug: r.slug, description: r.description, parent_id: r.parent_id, created_at: r.created_at }
    }
}

#[derive(sqlx::FromRow)]
struct PaletteRow { id: Uuid, name: String, hex_code: String, is_active: bool }

impl From<PaletteRow> for Color {
    fn from(r: PaletteRow) -> Self {
        Self { id: r.id, name: r.name, hex_code: r.hex_code, is_active: r.is_active }
    }
}

#[derive(sqlx::FromRow)]
struct DiscountRow {
    id: Uuid, name: String, description: Option<String>, discount_type: String, value: Decimal, scope: String,
    target_ids: Vec<Uuid>, min_order_amount: Option<Decimal>, max_discount_amount: Option<Decimal>,
    start_date: DateTime<Utc>, end_date: DateTime<Utc>, status: String,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl TryFrom<DiscountRow> for Discount {
    type Error = StorefrontError;
    fn try_from(r: DiscountRow) -> Result<Self> {
        Ok(Self {
            id: r.id, name: r.name, description: r.description, discount_type: label(&r.discount_type)?,
            value: r.value, scope: label(&r.scope)?, target_ids: r.target_ids,
            min_order_amount: r.min_order_amount, max_discount_amount: r.max_discount_amount,
            start_date: r.start_date, end_date: r.end_date, status: label(&r.status)?,
            created_at: r.created_at, updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: Uuid, discount_id: Uuid, code: String, usage_limit: i32, used_count: i32, per_user_limit: i32,
    start_date: DateTime<Utc>, end_date: DateTime<Utc>, status: String, created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = StorefrontError;
    fn try_from(r: CouponRow) -> Result<Self> {
        Ok(Self {
            id: r.id, discount_id: r.discount_id, code: r.code, usage_limit: r.usage_limit, used_count: r.used_count,
            per_user_limit: r.per_user_limit, start_date: r.start_date, end_date: r.end_date,
            status: label(&r.status)?, created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow { id: Uuid, review_type: String, target_id: Uuid, user_id: Uuid, rating: i16, comment: Option<String>, created_at: DateTime<Utc> }

impl TryFrom<ReviewRow> for Review {
    type Error = StorefrontError;
    fn try_from(r: ReviewRow) -> Result<Self> {
        let rating = u8::try_from(r.rating)
            .ok()
            .and_then(|v| Rating::new(v).ok())
            .ok_or_else(|| StorefrontError::Internal(format!("stored rating out of range: {}", r.rating)))?;
        Ok(Self { id: r.id, review_type: label(&r.review_type)?, target_id: r.target_id, user_id: r.user_id, rating, comment: r.comment, created_at: r.created_at })
    }
}

#[derive(sqlx::FromRow)]
struct ShopRow {
    id: Uuid, user_id: Uuid, username: String, shop_name: String, description: Option<String>,
    logo_url: Option<String>, banner_url: Option<String>, created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl TryFrom<ShopRow> for ShopProfile {
    type Error = StorefrontError;
    fn try_from(r: ShopRow) -> Result<Self> {
        Ok(Self {
            id: r.id, user_id: r.user_id,
            username: Username::new(&r.username).map_err(|e| StorefrontError::Internal(e.to_string()))?,
            shop_name: r.shop_name, description: r.description, logo_url: r.logo_url, banner_url: r.banner_url,
            created_at: r.created_at, updated_at: r.updated_at,
        })
    }
}

// =============================================================================
// Stores
// =============================================================================

#[async_trait]
impl SessionStore for PgStore {
    async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM sessions WHERE token = $1 AND expires_at > $2")
            .bind(token).bind(now).fetch_optional(&self.pool).await?;
        Ok(row.map(|(id,)| id))
    }
}

impl PgStore {
    /// Loads variants, colors and images for `products` in three queries.
    async fn attach_options(&self, products: &mut [Product]) -> Result<()> {
        if products.is_empty() { return Ok(()); }
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let variants = sqlx::query_as::<_, VariantRow>("SELECT * FROM product_variants WHERE product_id = ANY($1) ORDER BY variant_name, variant_value")
            .bind(&ids).fetch_all(&self.pool).await?;
        let colors = sqlx::query_as::<_, ColorRow>("SELECT * FROM product_colors WHERE product_id = ANY($1) ORDER BY name")
            .bind(&ids).fetch_all(&self.pool).await?;
        let images = sqlx::query_as::<_, ImageRow>("SELECT * FROM product_images WHERE product_id = ANY($1) ORDER BY position, created_at")
            .bind(&ids).fetch_all(&self.pool).await?;

        let index: HashMap<Uuid, usize> = products.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        for v in variants {
            if let Some(&i) = index.get(&v.product_id) { products[i].variants.push(v.into()); }
        }
        for c in colors {
            if let Some(&i) = index.get(&c.product_id) { products[i].colors.push(c.into()); }
        }
        for img in images {
            if let Some(&i) = index.get(&img.product_id) { products[i].images.push(img.into()); }
        }
        Ok(())
    }
}

const PRODUCT_FILTER: &str = "WHERE ($1::text IS NULL OR status = $1) \
    AND ($2::uuid IS NULL OR owner_id = $2) \
    AND ($3::uuid IS NULL OR category_id = $3) \
    AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%')";

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(&self, q: &ProductQuery) -> Result<(Vec<Product>, i64)> {
        let status = q.status.map(|s| s.as_str());
        let rows = sqlx::query_as::<_, ProductRow>(&format!("SELECT * FROM products {PRODUCT_FILTER} ORDER BY created_at DESC LIMIT $5 OFFSET $6"))
            .bind(status).bind(q.owner_id).bind(q.category_id).bind(q.search.as_deref()).bind(q.limit).bind(q.offset)
            .fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products {PRODUCT_FILTER}"))
            .bind(status).bind(q.owner_id).bind(q.category_id).bind(q.search.as_deref())
            .fetch_one(&self.pool).await?;
        let mut products = rows.into_iter().map(ProductRow::into_product).collect::<Result<Vec<_>>>()?;
        self.attach_options(&mut products).await?;
        Ok((products, total.0))
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        let Some(row) = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };
        let mut products = [row.into_product()?];
        self.attach_options(&mut products).await?;
        let [product] = products;
        Ok(Some(product))
    }

    async fn insert_product(&self, p: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, owner_id, sku, name, description, price, category_id, tags, stock_quantity, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)")
            .bind(p.id).bind(p.owner_id).bind(p.sku.as_str()).bind(&p.name).bind(&p.description).bind(p.price)
            .bind(p.category_id).bind(&p.tags).bind(p.stock_quantity).bind(p.status.as_str()).bind(p.created_at).bind(p.updated_at)
            .execute(&self.pool).await.map_err(|e| conflict_on_unique(e, "SKU already in use"))?;
        Ok(())
    }

    async fn update_product(&self, p: &Product) -> Result<()> {
        sqlx::query("UPDATE products SET name = $2, description = $3, price = $4, category_id = $5, tags = $6, stock_quantity = $7, status = $8, updated_at = $9 WHERE id = $1")
            .bind(p.id).bind(&p.name).bind(&p.description).bind(p.price).bind(p.category_id).bind(&p.tags)
            .bind(p.stock_quantity).bind(p.status.as_str()).bind(p.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_variant(&self, v: &ProductVariant) -> Result<()> {
        sqlx::query("INSERT INTO product_variants (id, product_id, variant_name, variant_value, price_adjustment, stock_quantity) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(v.id).bind(v.product_id).bind(&v.variant_name).bind(&v.variant_value).bind(v.price_adjustment).bind(v.stock_quantity)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_variant(&self, v: &ProductVariant) -> Result<bool> {
        let res = sqlx::query("UPDATE product_variants SET variant_name = $3, variant_value = $4, price_adjustment = $5, stock_quantity = $6 WHERE id = $1 AND product_id = $2")
            .bind(v.id).bind(v.product_id).bind(&v.variant_name).bind(&v.variant_value).bind(v.price_adjustment).bind(v.stock_quantity)
            .execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_variant(&self, product_id: Uuid, variant_id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM product_variants WHERE id = $1 AND product_id = $2")
            .bind(variant_id).bind(product_id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_color(&self, c: &ProductColor) -> Result<()> {
        sqlx::query("INSERT INTO product_colors (id, product_id, name, hex_code, price_adjustment, stock_quantity, is_active) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(c.id).bind(c.product_id).bind(&c.name).bind(&c.hex_code).bind(c.price_adjustment).bind(c.stock_quantity).bind(c.is_active)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_color(&self, c: &ProductColor) -> Result<bool> {
        let res = sqlx::query("UPDATE product_colors SET name = $3, hex_code = $4, price_adjustment = $5, stock_quantity = $6, is_active = $7 WHERE id = $1 AND product_id = $2")
            .bind(c.id).bind(c.product_id).bind(&c.name).bind(&c.hex_code).bind(c.price_adjustment).bind(c.stock_quantity).bind(c.is_active)
            .execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_color(&self, product_id: Uuid, color_id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM product_colors WHERE id = $1 AND product_id = $2")
            .bind(color_id).bind(product_id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_image(&self, img: &ProductImage) -> Result<()> {
        sqlx::query("INSERT INTO product_images (id, product_id, url, alt_text, position, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(img.id).bind(img.product_id).bind(&img.url).bind(&img.alt_text).bind(img.position).bind(img.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<Option<ProductImage>> {
        let row = sqlx::query_as::<_, ImageRow>("DELETE FROM product_images WHERE id = $1 AND product_id = $2 RETURNING *")
            .bind(image_id).bind(product_id).fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories ORDER BY name").fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }

    async fn insert_category(&self, c: &Category) -> Result<()> {
        sqlx::query("INSERT INTO categories (id, name, slug, description, parent_id, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(c.id).bind(&c.name).bind(&c.slug).bind(&c.description).bind(c.parent_id).bind(c.created_at)
            .execute(&self.pool).await.map_err(|e| conflict_on_unique(e, "Category slug already in use"))?;
        Ok(())
    }

    async fn list_colors(&self, is_active: Option<bool>) -> Result<Vec<Color>> {
        let rows = sqlx::query_as::<_, PaletteRow>("SELECT * FROM colors WHERE ($1::boolean IS NULL OR is_active = $1) ORDER BY name")
            .bind(is_active).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl DiscountStore for PgStore {
    async fn list_active_discounts(&self, now: DateTime<Utc>) -> Result<Vec<Discount>> {
        let rows = sqlx::query_as::<_, DiscountRow>("SELECT * FROM discounts WHERE status = 'active' AND start_date <= $1 AND end_date >= $1 ORDER BY created_at DESC")
            .bind(now).fetch_all(&self.pool).await?;
        rows.into_iter().map(Discount::try_from).collect()
    }

    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>> {
        let row = sqlx::query_as::<_, DiscountRow>("SELECT * FROM discounts WHERE id = $1").bind(id).fetch_optional(&self.pool).await?;
        row.map(Discount::try_from).transpose()
    }

    async fn insert_discount(&self, d: &Discount) -> Result<()> {
        sqlx::query("INSERT INTO discounts (id, name, description, discount_type, value, scope, target_ids, min_order_amount, max_discount_amount, start_date, end_date, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)")
            .bind(d.id).bind(&d.name).bind(&d.description).bind(d.discount_type.as_str()).bind(d.value).bind(d.scope.as_str())
            .bind(&d.target_ids).bind(d.min_order_amount).bind(d.max_discount_amount).bind(d.start_date).bind(d.end_date)
            .bind(d.status.as_str()).bind(d.created_at).bind(d.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn list_coupons(&self, discount_id: Uuid) -> Result<Vec<Coupon>> {
        let rows = sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE discount_id = $1 ORDER BY created_at")
            .bind(discount_id).fetch_all(&self.pool).await?;
        rows.into_iter().map(Coupon::try_from).collect()
    }

    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE code = $1").bind(code).fetch_optional(&self.pool).await?;
        row.map(Coupon::try_from).transpose()
    }

    async fn insert_coupon(&self, c: &Coupon) -> Result<()> {
        sqlx::query("INSERT INTO coupons (id, discount_id, code, usage_limit, used_count, per_user_limit, start_date, end_date, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
            .bind(c.id).bind(c.discount_id).bind(&c.code).bind(c.usage_limit).bind(c.used_count).bind(c.per_user_limit)
            .bind(c.start_date).bind(c.end_date).bind(c.status.as_str()).bind(c.created_at)
            .execute(&self.pool).await.map_err(|e| conflict_on_unique(e, "Coupon code already in use"))?;
        Ok(())
    }

    async fn count_redemptions(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = $1 AND user_id = $2")
            .bind(coupon_id).bind(user_id).fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    async fn redeem_coupon(&self, coupon_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Result<Coupon> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent redemptions of the same coupon.
        let row = sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE id = $1 FOR UPDATE")
            .bind(coupon_id).fetch_optional(&mut *tx).await?
            .ok_or(StorefrontError::NotFound("Coupon"))?;
        let coupon = Coupon::try_from(row)?;
        let used_by_user: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = $1 AND user_id = $2")
            .bind(coupon_id).bind(user_id).fetch_one(&mut *tx).await?;
        coupon.check(used_by_user.0, now)?;

        let updated = sqlx::query_as::<_, CouponRow>("UPDATE coupons SET used_count = used_count + 1 WHERE id = $1 AND used_count < usage_limit RETURNING *")
            .bind(coupon_id).fetch_optional(&mut *tx).await?
            .ok_or(StorefrontError::from(CouponRejection::Exhausted))?;
        sqlx::query("INSERT INTO coupon_redemptions (id, coupon_id, user_id, redeemed_at) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::now_v7()).bind(coupon_id).bind(user_id).bind(now)
            .execute(&mut *tx).await?;

        tx.commit().await?;
        Coupon::try_from(updated)
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn list_reviews(&self, q: &ReviewQuery) -> Result<(Vec<Review>, i64)> {
        let review_type = q.review_type.map(|t| t.as_str());
        let rows = sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE ($1::text IS NULL OR review_type = $1) AND ($2::uuid IS NULL OR target_id = $2) ORDER BY created_at DESC LIMIT $3 OFFSET $4")
            .bind(review_type).bind(q.target_id).bind(q.limit).bind(q.offset)
            .fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE ($1::text IS NULL OR review_type = $1) AND ($2::uuid IS NULL OR target_id = $2)")
            .bind(review_type).bind(q.target_id).fetch_one(&self.pool).await?;
        let reviews = rows.into_iter().map(Review::try_from).collect::<Result<Vec<_>>>()?;
        Ok((reviews, total.0))
    }

    async fn rating_totals(&self, review_type: ReviewType, target_id: Uuid) -> Result<(i64, i64)> {
        let totals: (Option<i64>, i64) = sqlx::query_as("SELECT SUM(rating)::bigint, COUNT(*) FROM reviews WHERE review_type = $1 AND target_id = $2")
            .bind(review_type.as_str()).bind(target_id).fetch_one(&self.pool).await?;
        Ok((totals.0.unwrap_or(0), totals.1))
    }

    async fn insert_review(&self, r: &Review) -> Result<()> {
        sqlx::query("INSERT INTO reviews (id, review_type, target_id, user_id, rating, comment, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(r.id).bind(r.review_type.as_str()).bind(r.target_id).bind(r.user_id).bind(i16::from(r.rating.value()))
            .bind(&r.comment).bind(r.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ShopStore for PgStore {
    async fn find_shop_by_username(&self, username: &str) -> Result<Option<ShopProfile>> {
        let row = sqlx::query_as::<_, ShopRow>("SELECT * FROM shop_profiles WHERE username = $1")
            .bind(username.to_ascii_lowercase()).fetch_optional(&self.pool).await?;
        row.map(ShopProfile::try_from).transpose()
    }

    async fn find_shop_by_id(&self, id: Uuid) -> Result<Option<ShopProfile>> {
        let row = sqlx::query_as::<_, ShopRow>("SELECT * FROM shop_profiles WHERE id = $1").bind(id).fetch_optional(&self.pool).await?;
        row.map(ShopProfile::try_from).transpose()
    }

    async fn find_shop_by_user(&self, user_id: Uuid) -> Result<Option<ShopProfile>> {
        let row = sqlx::query_as::<_, ShopRow>("SELECT * FROM shop_profiles WHERE user_id = $1").bind(user_id).fetch_optional(&self.pool).await?;
        row.map(ShopProfile::try_from).transpose()
    }

    async fn save_shop(&self, s: &ShopProfile) -> Result<()> {
        sqlx::query("INSERT INTO shop_profiles (id, user_id, username, shop_name, description, logo_url, banner_url, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username, shop_name = EXCLUDED.shop_name, description = EXCLUDED.description, \
            logo_url = EXCLUDED.logo_url, banner_url = EXCLUDED.banner_url, updated_at = EXCLUDED.updated_at")
            .bind(s.id).bind(s.user_id).bind(s.username.as_str()).bind(&s.shop_name).bind(&s.description)
            .bind(&s.logo_url).bind(&s.banner_url).bind(s.created_at).bind(s.updated_at)
            .execute(&self.pool).await.map_err(|e| conflict_on_unique(e, "Username already taken"))?;
        Ok(())
    }
}
