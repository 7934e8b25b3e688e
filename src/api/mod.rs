//! HTTP surface: handlers grouped by resource, and the router that mounts them.

pub mod auth;
pub mod catalog;
pub mod discounts;
pub mod extract;
pub mod images;
pub mod money;
pub mod product_options;
pub mod products;
pub mod response;
pub mod reviews;
pub mod shop_profiles;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

// Room for the multipart framing and the altText field around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "storefront"}))
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/health", get(health))
        .route("/api/discounts", post(discounts::create_discount))
        .route("/api/discounts/available", get(discounts::available))
        .route("/api/discounts/:id/coupons", post(discounts::create_coupon))
        .route("/api/coupons/validate", post(discounts::validate_coupon))
        .route("/api/coupons/redeem", post(discounts::redeem_coupon))
        .route("/api/products", get(products::list_products).post(products::create_product))
        .route("/api/products/mine", get(products::list_my_products))
        .route("/api/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/api/products/:id/publish", post(products::publish_product))
        .route("/api/products/:id/price", post(products::quote_price))
        .route("/api/products/:id/images", post(images::upload_image).layer(DefaultBodyLimit::max(upload_limit)))
        .route("/api/products/:id/images/:image_id", delete(images::delete_image))
        .route("/api/products/:id/colors", get(product_options::list_colors).post(product_options::create_color))
        .route("/api/products/:id/colors/:color_id", put(product_options::update_color).delete(product_options::delete_color))
        .route("/api/products/:id/variants", get(product_options::list_variants).post(product_options::create_variant))
        .route("/api/products/:id/variants/:variant_id", put(product_options::update_variant).delete(product_options::delete_variant))
        .route("/api/reviews", get(reviews::list_reviews).post(reviews::submit_review))
        .route("/api/reviews/average", get(reviews::average_rating))
        .route("/api/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/api/categories/:id", get(catalog::get_category))
        .route("/api/colors", get(catalog::list_colors))
        .route("/api/shop-profiles", put(shop_profiles::save_own))
        .route("/api/shop-profiles/username/:username", get(shop_profiles::by_username))
        .route("/api/shop-profiles/id/:id", get(shop_profiles::by_id))
        .route("/api/shop-profiles/user/:user_id", get(shop_profiles::by_user))
        .nest_service(images::UPLOADS_ROUTE, uploads)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
