//! Domain events
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Product(ProductEvent),
    Coupon(CouponEvent),
    Review(ReviewEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, owner_id: Uuid, sku: String },
    Published { product_id: Uuid },
    Archived { product_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponEvent {
    Redeemed { coupon_id: Uuid, discount_id: Uuid, user_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEvent {
    Submitted { review_id: Uuid, target_id: Uuid, rating: u8 },
}

impl DomainEvent {
    /// NATS subject, `storefront.<aggregate>.<event>`.
    pub fn subject(&self) -> String {
        let (aggregate, name) = match self {
            Self::Product(e) => ("product", match e {
                ProductEvent::Created { .. } => "created",
                ProductEvent::Published { .. } => "published",
                ProductEvent::Archived { .. } => "archived",
            }),
            Self::Coupon(CouponEvent::Redeemed { .. }) => ("coupon", "redeemed"),
            Self::Review(ReviewEvent::Submitted { .. }) => ("review", "submitted"),
        };
        format!("storefront.{aggregate}.{name}")
    }

    pub fn payload(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::Product(e) => serde_json::to_vec(e),
            Self::Coupon(e) => serde_json::to_vec(e),
            Self::Review(e) => serde_json::to_vec(e),
        }
    }
}
