//! Discount availability, coupon validation and redemption.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::discount::{normalize_code, AvailableDiscount, Coupon, Discount, DiscountContext};
use crate::domain::events::{CouponEvent, DomainEvent};
use crate::error::{Result, StorefrontError};
use crate::storage::Store;

pub struct DiscountService<'a> {
    store: &'a dyn Store,
    sample_shipping_cost: Decimal,
}

impl<'a> DiscountService<'a> {
    pub fn new(store: &'a dyn Store, sample_shipping_cost: Decimal) -> Self {
        Self { store, sample_shipping_cost }
    }

    /// Discounts the shopper can use right now, each with its valid coupons
    /// and a preview of the saving.
    ///
    /// The active set is read once; applicability is decided in process so a
    /// discount that misses the cart can still surface through its coupons.
    /// A failed coupon lookup only drops that discount's coupons.
    pub async fn available(&self, ctx: &DiscountContext, now: DateTime<Utc>) -> Result<Vec<AvailableDiscount>> {
        let active = self.store.list_active_discounts(now).await?;
        let coupon_sets = join_all(active.iter().map(|d| self.valid_coupons_or_none(d, ctx.user_id, now))).await;

        let available: Vec<AvailableDiscount> = active
            .iter()
            .zip(coupon_sets)
            .filter_map(|(discount, coupons)| {
                AvailableDiscount::assemble(discount, &coupons, ctx, now, self.sample_shipping_cost)
            })
            .collect();
        debug!(user_id = %ctx.user_id, active = active.len(), offered = available.len(), "resolved available discounts");
        Ok(available)
    }

    async fn valid_coupons_or_none(&self, discount: &Discount, user_id: Uuid, now: DateTime<Utc>) -> Vec<Coupon> {
        match self.valid_coupons(discount.id, user_id, now).await {
            Ok(coupons) => coupons,
            Err(e) => {
                warn!(discount_id = %discount.id, error = %e, "coupon lookup failed; offering discount without coupons");
                vec![]
            }
        }
    }

    async fn valid_coupons(&self, discount_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Coupon>> {
        let mut valid = vec![];
        for coupon in self.store.list_coupons(discount_id).await? {
            // Skip the per-user lookup when the coupon fails on its own terms.
            if coupon.check(0, now).is_err() {
                continue;
            }
            let used = self.store.count_redemptions(coupon.id, user_id).await?;
            if coupon.is_valid_for(used, now) {
                valid.push(coupon);
            }
        }
        Ok(valid)
    }

    /// The coupon behind `code` and its discount, when the user may use it now.
    pub async fn validate_code(&self, code: &str, user_id: Uuid, now: DateTime<Utc>) -> Result<(Coupon, Discount)> {
        let coupon = self
            .store
            .find_coupon_by_code(&normalize_code(code))
            .await?
            .ok_or(StorefrontError::NotFound("Coupon"))?;
        let used = self.store.count_redemptions(coupon.id, user_id).await?;
        coupon.check(used, now).map_err(StorefrontError::validation)?;
        let discount = self.active_parent(&coupon, now).await?;
        Ok((coupon, discount))
    }

    /// Redeems `code` for `user_id`, returning the updated coupon and the
    /// event to publish.
    pub async fn redeem(&self, code: &str, user_id: Uuid, now: DateTime<Utc>) -> Result<(Coupon, DomainEvent)> {
        let coupon = self
            .store
            .find_coupon_by_code(&normalize_code(code))
            .await?
            .ok_or(StorefrontError::NotFound("Coupon"))?;
        self.active_parent(&coupon, now).await?;
        let redeemed = self.store.redeem_coupon(coupon.id, user_id, now).await?;
        tracing::info!(coupon_id = %redeemed.id, %user_id, used = redeemed.used_count, limit = redeemed.usage_limit, "coupon redeemed");
        let event = DomainEvent::Coupon(CouponEvent::Redeemed { coupon_id: redeemed.id, discount_id: redeemed.discount_id, user_id });
        Ok((redeemed, event))
    }

    async fn active_parent(&self, coupon: &Coupon, now: DateTime<Utc>) -> Result<Discount> {
        let discount = self
            .store
            .get_discount(coupon.discount_id)
            .await?
            .ok_or(StorefrontError::NotFound("Discount"))?;
        if !discount.is_active_at(now) {
            return Err(StorefrontError::Validation("discount is not currently active".into()));
        }
        Ok(discount)
    }
}
