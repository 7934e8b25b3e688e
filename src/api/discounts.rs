//! Discount availability, merchant discount setup, coupon validation and redemption.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::auth::SessionUser;
use crate::api::extract::{Path, Payload, Query};
use crate::api::money::{non_negative_amount, positive_amount};
use crate::api::response::{ApiResponse, ApiResult};
use crate::domain::discount::{
    normalize_code, AvailableDiscount, Coupon, CouponStatus, CouponSummary, Discount, DiscountContext, DiscountScope,
    DiscountStatus, DiscountSummary, DiscountType,
};
use crate::domain::pricing::is_storable_amount;
use crate::error::{Result, StorefrontError};
use crate::services::DiscountService;
use crate::AppState;

/// Parses the shopper context from the raw query pairs.
///
/// Id lists accept repeated `productIds[]=` / `productIds=` keys as well as
/// comma-separated values.
fn parse_context(user_id: Uuid, pairs: &[(String, String)]) -> Result<DiscountContext> {
    let mut ctx = DiscountContext::browsing(user_id);
    for (key, value) in pairs {
        match key.trim_end_matches("[]") {
            "orderAmount" if !value.trim().is_empty() => {
                let amount: Decimal = value
                    .trim()
                    .parse()
                    .map_err(|_| StorefrontError::Validation(format!("invalid orderAmount: {value}")))?;
                if amount < Decimal::ZERO {
                    return Err(StorefrontError::Validation("orderAmount must not be negative".into()));
                }
                if !is_storable_amount(&amount) {
                    return Err(StorefrontError::Validation(format!("orderAmount out of range: {value}")));
                }
                ctx.order_amount = amount;
            }
            "productIds" => ctx.product_ids.extend(parse_ids("productIds", value)?),
            "categoryIds" => ctx.category_ids.extend(parse_ids("categoryIds", value)?),
            _ => {}
        }
    }
    Ok(ctx)
}

fn parse_ids(key: &str, value: &str) -> Result<Vec<Uuid>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| StorefrontError::Validation(format!("invalid id in {key}: {s}"))))
        .collect()
}

pub async fn available(
    user: SessionUser,
    State(s): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<AvailableDiscount>> {
    let ctx = parse_context(user.user_id, &pairs)?;
    let service = DiscountService::new(s.store.as_ref(), s.config.sample_shipping_cost);
    Ok(ApiResponse::ok(service.available(&ctx, Utc::now()).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscountRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    #[validate(custom = "positive_amount")]
    pub value: Decimal,
    pub scope: DiscountScope,
    #[serde(default)]
    pub target_ids: Vec<Uuid>,
    #[validate(custom = "non_negative_amount")]
    pub min_order_amount: Option<Decimal>,
    #[validate(custom = "non_negative_amount")]
    pub max_discount_amount: Option<Decimal>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl CreateDiscountRequest {
    fn into_discount(self) -> Result<Discount> {
        self.validate()?;
        if self.discount_type == DiscountType::Percentage && self.value > Decimal::ONE_HUNDRED {
            return Err(StorefrontError::Validation("percentage value must not exceed 100".into()));
        }
        if self.end_date <= self.start_date {
            return Err(StorefrontError::Validation("endDate must be after startDate".into()));
        }
        if matches!(self.scope, DiscountScope::Product | DiscountScope::Category) && self.target_ids.is_empty() {
            return Err(StorefrontError::Validation(format!("{} discounts need at least one target id", self.scope)));
        }
        let now = Utc::now();
        Ok(Discount {
            id: Uuid::now_v7(),
            name: self.name.trim().to_string(),
            description: self.description,
            discount_type: self.discount_type,
            value: self.value,
            scope: self.scope,
            target_ids: self.target_ids,
            min_order_amount: self.min_order_amount,
            max_discount_amount: self.max_discount_amount,
            start_date: self.start_date,
            end_date: self.end_date,
            status: DiscountStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }
}

pub async fn create_discount(
    user: SessionUser,
    State(s): State<AppState>,
    Payload(r): Payload<CreateDiscountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Discount>>)> {
    let discount = r.into_discount()?;
    s.store.insert_discount(&discount).await?;
    tracing::info!(discount_id = %discount.id, created_by = %user.user_id, scope = %discount.scope, "discount created");
    Ok((StatusCode::CREATED, ApiResponse::ok(discount)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    #[validate(length(min = 3, max = 32))]
    pub code: String,
    #[validate(range(min = 1))]
    pub usage_limit: i32,
    #[validate(range(min = 1))]
    pub per_user_limit: Option<i32>,
    /// Defaults to the discount's window.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub async fn create_coupon(
    _user: SessionUser,
    State(s): State<AppState>,
    Path(discount_id): Path<Uuid>,
    Payload(r): Payload<CreateCouponRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Coupon>>)> {
    r.validate()?;
    let code = normalize_code(&r.code);
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(StorefrontError::Validation("coupon code may only contain letters, digits, '-' and '_'".into()));
    }
    let discount = s.store.get_discount(discount_id).await?.ok_or(StorefrontError::NotFound("Discount"))?;
    let start_date = r.start_date.unwrap_or(discount.start_date);
    let end_date = r.end_date.unwrap_or(discount.end_date);
    if end_date <= start_date {
        return Err(StorefrontError::Validation("endDate must be after startDate".into()));
    }
    let coupon = Coupon {
        id: Uuid::now_v7(),
        discount_id,
        code,
        usage_limit: r.usage_limit,
        used_count: 0,
        per_user_limit: r.per_user_limit.unwrap_or(1),
        start_date,
        end_date,
        status: CouponStatus::Active,
        created_at: Utc::now(),
    };
    s.store.insert_coupon(&coupon).await?;
    tracing::info!(coupon_id = %coupon.id, %discount_id, "coupon created");
    Ok((StatusCode::CREATED, ApiResponse::ok(coupon)))
}

#[derive(Debug, Deserialize)]
pub struct CouponCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidatedCoupon {
    pub coupon: CouponSummary,
    pub discount: DiscountSummary,
}

pub async fn validate_coupon(
    user: SessionUser,
    State(s): State<AppState>,
    Payload(r): Payload<CouponCodeRequest>,
) -> ApiResult<ValidatedCoupon> {
    let service = DiscountService::new(s.store.as_ref(), s.config.sample_shipping_cost);
    let (coupon, discount) = service.validate_code(&r.code, user.user_id, Utc::now()).await?;
    Ok(ApiResponse::ok(ValidatedCoupon { coupon: CouponSummary::from(&coupon), discount: DiscountSummary::from(&discount) }))
}

pub async fn redeem_coupon(
    user: SessionUser,
    State(s): State<AppState>,
    Payload(r): Payload<CouponCodeRequest>,
) -> ApiResult<CouponSummary> {
    let service = DiscountService::new(s.store.as_ref(), s.config.sample_shipping_cost);
    let (coupon, event) = service.redeem(&r.code, user.user_id, Utc::now()).await?;
    s.events.publish(vec![event]).await;
    Ok(ApiResponse::ok(CouponSummary::from(&coupon)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_context() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();
        let ctx = parse_context(
            Uuid::nil(),
            &pairs(&[
                ("orderAmount", "42.50"),
                ("productIds[]", &a.to_string()),
                ("productIds", &format!("{b}, ")),
                ("categoryIds[]", &c.to_string()),
            ]),
        )
        .unwrap();
        assert_eq!(ctx.order_amount, dec!(42.50));
        assert_eq!(ctx.product_ids, vec![a, b]);
        assert_eq!(ctx.category_ids, vec![c]);
    }

    #[test]
    fn test_parse_context_defaults_and_errors() {
        let ctx = parse_context(Uuid::nil(), &pairs(&[("orderAmount", "")])).unwrap();
        assert_eq!(ctx.order_amount, Decimal::ZERO);
        assert!(parse_context(Uuid::nil(), &pairs(&[("orderAmount", "-1")])).is_err());
        assert!(parse_context(Uuid::nil(), &pairs(&[("orderAmount", "79228162514264337593543950335")])).is_err());
        assert!(parse_context(Uuid::nil(), &pairs(&[("orderAmount", "10000000000")])).is_err());
        assert!(parse_context(Uuid::nil(), &pairs(&[("productIds[]", "not-an-id")])).is_err());
    }
}
