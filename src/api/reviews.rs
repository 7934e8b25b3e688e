//! Review listing, rating averages and submission.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::auth::SessionUser;
use crate::api::extract::{Payload, Query};
use crate::api::response::{ApiResponse, ApiResult, PageParams, Paginated};
use crate::domain::review::{RatingSummary, Review, ReviewType};
use crate::domain::value_objects::Rating;
use crate::error::{Result, StorefrontError};
use crate::storage::ReviewQuery;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListParams {
    #[serde(rename = "type")]
    pub review_type: Option<ReviewType>,
    pub target_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_reviews(State(s): State<AppState>, Query(p): Query<ReviewListParams>) -> ApiResult<Paginated<Review>> {
    let pages = PageParams { page: p.page, per_page: p.per_page };
    let (limit, offset) = pages.limit_offset();
    let query = ReviewQuery { review_type: p.review_type, target_id: p.target_id, limit, offset };
    let (items, total) = s.store.list_reviews(&query).await?;
    let (page, per_page) = pages.resolve();
    Ok(ApiResponse::ok(Paginated { items, total, page, per_page }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageParams {
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub target_id: Uuid,
}

pub async fn average_rating(State(s): State<AppState>, Query(p): Query<AverageParams>) -> ApiResult<RatingSummary> {
    let (sum, count) = s.store.rating_totals(p.review_type, p.target_id).await?;
    Ok(ApiResponse::ok(RatingSummary::from_totals(sum, count)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub target_id: Uuid,
    pub rating: u8,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

async fn ensure_target(s: &AppState, review_type: ReviewType, target_id: Uuid) -> Result<()> {
    match review_type {
        ReviewType::Product => {
            let product = s.store.get_product(target_id).await?;
            if !product.map_or(false, |p| p.is_public()) {
                return Err(StorefrontError::NotFound("Product"));
            }
        }
        ReviewType::Shop => {
            s.store.find_shop_by_id(target_id).await?.ok_or(StorefrontError::NotFound("Shop profile"))?;
        }
    }
    Ok(())
}

pub async fn submit_review(user: SessionUser, State(s): State<AppState>, Payload(r): Payload<SubmitReviewRequest>) -> Result<(StatusCode, Json<ApiResponse<Review>>)> {
    r.validate()?;
    let rating = Rating::new(r.rating).map_err(StorefrontError::validation)?;
    ensure_target(&s, r.review_type, r.target_id).await?;
    let (review, event) = Review::submit(r.review_type, r.target_id, user.user_id, rating, r.comment);
    s.store.insert_review(&review).await?;
    tracing::info!(review_id = %review.id, target_id = %review.target_id, rating = rating.value(), "review submitted");
    s.events.publish(vec![event]).await;
    Ok((StatusCode::CREATED, ApiResponse::ok(review)))
}
