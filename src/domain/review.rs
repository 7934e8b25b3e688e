//! Product and shop reviews.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{DomainEvent, ReviewEvent};
use crate::domain::labelled_enum;
use crate::domain::value_objects::Rating;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Product,
    Shop,
}

labelled_enum!(ReviewType, "review type", { Product => "product", Shop => "shop" });

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub target_id: Uuid,
    pub user_id: Uuid,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn submit(review_type: ReviewType, target_id: Uuid, user_id: Uuid, rating: Rating, comment: Option<String>) -> (Self, DomainEvent) {
        let review = Self {
            id: Uuid::now_v7(),
            review_type,
            target_id,
            user_id,
            rating,
            comment: comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        };
        let event = DomainEvent::Review(ReviewEvent::Submitted {
            review_id: review.id,
            target_id,
            rating: rating.value(),
        });
        (review, event)
    }
}

/// Average star rating over all reviews of one target.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Rounded to one decimal place; zero when there are no reviews.
    pub average: Decimal,
    pub count: i64,
}

impl RatingSummary {
    pub fn from_totals(rating_sum: i64, count: i64) -> Self {
        if count <= 0 {
            return Self { average: Decimal::ZERO, count: 0 };
        }
        let average = (Decimal::from(rating_sum) / Decimal::from(count)).round_dp(1);
        Self { average, count }
    }
}
