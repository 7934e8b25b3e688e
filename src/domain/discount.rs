//! Discounts, coupons and the rules deciding which ones a shopper may use.
//!
//! A [`Discount`] describes a price reduction over one cart dimension (its
//! [`DiscountScope`]). A [`Coupon`] is a redeemable code attached to exactly
//! one discount. [`AvailableDiscount::assemble`] combines the two into the
//! entry shown to a shopper, including a preview of the amount they would save.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::labelled_enum;

/// Shipping cost used to preview shipping-scoped discounts when no real
/// shipping quote exists.
pub const DEFAULT_SAMPLE_SHIPPING_COST: Decimal = Decimal::from_parts(999, 0, 0, false, 2);

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `value` is a percent, 0 to 100.
    Percentage,
    /// `value` is an amount of money.
    Fixed,
}

labelled_enum!(DiscountType, "discount type", { Percentage => "percentage", Fixed => "fixed" });

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountScope {
    Product,
    Category,
    Order,
    Shipping,
}

labelled_enum!(DiscountScope, "discount scope", {
    Product => "product",
    Category => "category",
    Order => "order",
    Shipping => "shipping",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountStatus {
    #[default]
    Active,
    Inactive,
    Expired,
}

labelled_enum!(DiscountStatus, "discount status", {
    Active => "active",
    Inactive => "inactive",
    Expired => "expired",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    #[default]
    Active,
    Inactive,
}

labelled_enum!(CouponStatus, "coupon status", { Active => "active", Inactive => "inactive" });

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub scope: DiscountScope,
    /// Product ids for product scope, category ids for category scope.
    pub target_ids: Vec<Uuid>,
    pub min_order_amount: Option<Decimal>,
    pub max_discount_amount: Option<Decimal>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: DiscountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the shopper currently has in hand when asking which discounts apply.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscountContext {
    pub user_id: Uuid,
    pub product_ids: Vec<Uuid>,
    pub category_ids: Vec<Uuid>,
    /// Zero when the order total is unknown, e.g. browsing without a cart.
    pub order_amount: Decimal,
}

impl DiscountContext {
    pub fn browsing(user_id: Uuid) -> Self {
        Self { user_id, product_ids: vec![], category_ids: vec![], order_amount: Decimal::ZERO }
    }
}

impl Discount {
    /// Active status and `now` inside `[start_date, end_date]`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == DiscountStatus::Active && self.start_date <= now && now <= self.end_date
    }

    /// Scope and minimum-order rules against the shopper's context.
    pub fn matches(&self, ctx: &DiscountContext) -> bool {
        let in_scope = match self.scope {
            DiscountScope::Product => self.target_ids.iter().any(|id| ctx.product_ids.contains(id)),
            DiscountScope::Category => self.target_ids.iter().any(|id| ctx.category_ids.contains(id)),
            DiscountScope::Order | DiscountScope::Shipping => true,
        };
        in_scope && self.min_order_amount.map_or(true, |min| min <= ctx.order_amount)
    }

    pub fn is_applicable(&self, ctx: &DiscountContext, now: DateTime<Utc>) -> bool {
        self.is_active_at(now) && self.matches(ctx)
    }

    /// Amount this discount would take off, for display.
    ///
    /// Shipping-scoped discounts are measured against `sample_shipping_cost`
    /// and never exceed it; the others against `order_amount`, capped by
    /// `max_discount_amount`. Never negative; saturates at `Decimal::MAX`.
    pub fn preview_amount(&self, order_amount: Decimal, sample_shipping_cost: Decimal) -> Decimal {
        let amount = match self.scope {
            DiscountScope::Shipping => match self.discount_type {
                DiscountType::Percentage => percent_of(sample_shipping_cost, self.value),
                DiscountType::Fixed => self.value.min(sample_shipping_cost),
            },
            _ => {
                let raw = match self.discount_type {
                    DiscountType::Percentage => percent_of(order_amount, self.value),
                    DiscountType::Fixed => self.value,
                };
                match self.max_discount_amount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
        };
        amount.max(Decimal::ZERO)
    }
}

fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount.checked_mul(percent).map_or(Decimal::MAX, |v| v / ONE_HUNDRED)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub discount_id: Uuid,
    pub code: String,
    pub usage_limit: i32,
    pub used_count: i32,
    pub per_user_limit: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: CouponStatus,
    pub created_at: DateTime<Utc>,
}

/// Why a coupon cannot be used right now.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CouponRejection {
    #[error("coupon is not active")]
    Inactive,
    #[error("coupon is not valid yet")]
    NotStarted,
    #[error("coupon has expired")]
    Expired,
    #[error("coupon usage limit reached")]
    Exhausted,
    #[error("coupon already used the maximum number of times by this user")]
    UserLimitReached,
}

/// Canonical form of a coupon code as typed by a shopper.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coupon {
    pub fn is_exhausted(&self) -> bool {
        self.used_count >= self.usage_limit
    }

    /// Checks the coupon for a user who has already redeemed it
    /// `user_redemptions` times.
    pub fn check(&self, user_redemptions: i64, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if self.status != CouponStatus::Active {
            return Err(CouponRejection::Inactive);
        }
        if now < self.start_date {
            return Err(CouponRejection::NotStarted);
        }
        if now > self.end_date {
            return Err(CouponRejection::Expired);
        }
        if self.is_exhausted() {
            return Err(CouponRejection::Exhausted);
        }
        if user_redemptions >= i64::from(self.per_user_limit) {
            return Err(CouponRejection::UserLimitReached);
        }
        Ok(())
    }

    pub fn is_valid_for(&self, user_redemptions: i64, now: DateTime<Utc>) -> bool {
        self.check(user_redemptions, now).is_ok()
    }
}

/// Discount fields exposed to shoppers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub scope: DiscountScope,
    pub min_order_amount: Option<Decimal>,
    pub max_discount_amount: Option<Decimal>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<&Discount> for DiscountSummary {
    fn from(d: &Discount) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            description: d.description.clone(),
            discount_type: d.discount_type,
            value: d.value,
            scope: d.scope,
            min_order_amount: d.min_order_amount,
            max_discount_amount: d.max_discount_amount,
            start_date: d.start_date,
            end_date: d.end_date,
        }
    }
}

/// Coupon fields exposed to shoppers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponSummary {
    pub id: Uuid,
    pub code: String,
    pub usage_limit: i32,
    pub used_count: i32,
    pub per_user_limit: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<&Coupon> for CouponSummary {
    fn from(c: &Coupon) -> Self {
        Self {
            id: c.id,
            code: c.code.clone(),
            usage_limit: c.usage_limit,
            used_count: c.used_count,
            per_user_limit: c.per_user_limit,
            start_date: c.start_date,
            end_date: c.end_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDiscount {
    pub discount: DiscountSummary,
    pub coupons: Vec<CouponSummary>,
    pub preview_discount_amount: Decimal,
    pub requires_coupon: bool,
    pub is_applicable: bool,
}

impl AvailableDiscount {
    /// Builds the shopper-facing entry for `discount`, given the coupons
    /// already found valid for this shopper.
    ///
    /// A discount is offered when it applies to the context OR when it has at
    /// least one valid coupon, so codes stay enterable even when the cart
    /// does not match the discount's own criteria. Returns `None` otherwise.
    pub fn assemble(
        discount: &Discount,
        valid_coupons: &[Coupon],
        ctx: &DiscountContext,
        now: DateTime<Utc>,
        sample_shipping_cost: Decimal,
    ) -> Option<Self> {
        let is_applicable = discount.is_applicable(ctx, now);
        if !is_applicable && valid_coupons.is_empty() {
            return None;
        }
        Some(Self {
            discount: DiscountSummary::from(discount),
            coupons: valid_coupons.iter().map(CouponSummary::from).collect(),
            preview_discount_amount: discount.preview_amount(ctx.order_amount, sample_shipping_cost),
            requires_coupon: !valid_coupons.is_empty(),
            is_applicable,
        })
    }
}
