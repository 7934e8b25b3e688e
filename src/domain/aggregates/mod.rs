//! Aggregates module
pub mod product;

pub use product::{Product, ProductColor, ProductDetails, ProductError, ProductImage, ProductStatus, ProductVariant};
