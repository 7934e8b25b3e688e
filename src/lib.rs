//! Storefront - Self-hosted Marketplace Catalog Service
//!
//! Sellers manage products with colors, variants and images; shoppers browse
//! the published catalog, price their selections and apply discounts.
//!
//! ## Features
//! - Product catalog with draft / active / archived lifecycle
//! - Per-color and per-variant price adjustments
//! - Discounts with product, category, order and shipping scope
//! - Coupon validation and atomic redemption
//! - Product and shop reviews with rating averages
//! - Shop profiles and the shared color palette

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod publisher;
pub mod services;
pub mod storage;

use std::sync::Arc;

use axum::Router;

pub use config::Config;
pub use error::{Result, StorefrontError};
pub use publisher::EventPublisher;

use storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub events: EventPublisher,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config, events: EventPublisher) -> Self {
        Self { store, config: Arc::new(config), events }
    }
}

/// The full HTTP application, ready to serve.
pub fn app(state: AppState) -> Router {
    api::router(state)
}
