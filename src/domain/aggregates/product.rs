//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::labelled_enum;
use crate::domain::pricing::{self, PriceQuote, PriceSelection};
use crate::domain::value_objects::Sku;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub sku: Sku,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub variants: Vec<ProductVariant>,
    pub colors: Vec<ProductColor>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_name: String,
    pub variant_value: String,
    pub price_adjustment: Decimal,
    pub stock_quantity: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColor {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub hex_code: String,
    pub price_adjustment: Decimal,
    pub stock_quantity: i32,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus { #[default] Draft, Active, Archived }

labelled_enum!(ProductStatus, "product status", { Draft => "draft", Active => "active", Archived => "archived" });

/// Merchant-editable product fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub stock_quantity: i32,
}

impl Product {
    /// New products start as drafts owned by `owner_id`.
    pub fn create(owner_id: Uuid, sku: Sku, details: ProductDetails) -> Self {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut product = Self {
            id, owner_id, sku: sku.clone(), name: details.name, description: details.description,
            price: details.price, category_id: details.category_id, tags: details.tags,
            stock_quantity: details.stock_quantity, status: ProductStatus::Draft,
            variants: vec![], colors: vec![], images: vec![],
            created_at: now, updated_at: now, events: vec![],
        };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id, owner_id, sku: sku.to_string() }));
        product
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool { self.owner_id == user_id }
    pub fn is_public(&self) -> bool { self.status == ProductStatus::Active }

    pub fn update_details(&mut self, details: ProductDetails) {
        self.name = details.name;
        self.description = details.description;
        self.price = details.price;
        self.category_id = details.category_id;
        self.tags = details.tags;
        self.stock_quantity = details.stock_quantity;
        self.touch();
    }

    /// Draft to active. Publishing an active product is a no-op.
    pub fn publish(&mut self) -> Result<(), ProductError> {
        match self.status {
            ProductStatus::Active => return Ok(()),
            ProductStatus::Archived => return Err(ProductError::Archived),
            ProductStatus::Draft => {}
        }
        if self.name.trim().is_empty() { return Err(ProductError::MissingName); }
        if self.price < Decimal::ZERO { return Err(ProductError::NegativePrice); }
        self.status = ProductStatus::Active;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Published { product_id: self.id }));
        Ok(())
    }

    pub fn archive(&mut self) {
        if self.status == ProductStatus::Archived { return; }
        self.status = ProductStatus::Archived;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Archived { product_id: self.id }));
    }

    pub fn color(&self, color_id: Uuid) -> Option<&ProductColor> {
        self.colors.iter().find(|c| c.id == color_id)
    }

    pub fn quote(&self, selection: &PriceSelection) -> PriceQuote {
        let color = selection.color_id.and_then(|id| self.color(id));
        pricing::quote(self.price, color, &self.variants, &selection.variants)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { MissingName, NegativePrice, Archived }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Product name is required"),
            Self::NegativePrice => write!(f, "Product price must not be negative"),
            Self::Archived => write!(f, "Archived products cannot be published"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn details(name: &str, price: Decimal) -> ProductDetails {
        ProductDetails { name: name.into(), description: None, price, category_id: None, tags: vec![], stock_quantity: 3 }
    }

    #[test]
    fn test_product_create() {
        let owner = Uuid::now_v7();
        let mut p = Product::create(owner, Sku::new("TEST-001").unwrap(), details("Test Product", dec!(19.99)));
        assert_eq!(p.name, "Test Product");
        assert_eq!(p.status, ProductStatus::Draft);
        assert!(p.is_owned_by(owner));
        assert!(matches!(p.take_events().as_slice(), [DomainEvent::Product(ProductEvent::Created { .. })]));
    }

    #[test]
    fn test_publish_lifecycle() {
        let mut p = Product::create(Uuid::now_v7(), Sku::generate(), details("Lamp", dec!(40)));
        p.take_events();
        p.publish().unwrap();
        assert!(p.is_public());
        p.publish().unwrap();
        assert_eq!(p.take_events().len(), 1);
        p.archive();
        assert_eq!(p.publish(), Err(ProductError::Archived));
    }

    #[test]
    fn test_publish_requires_name_and_price() {
        let mut p = Product::create(Uuid::now_v7(), Sku::generate(), details("  ", dec!(40)));
        assert_eq!(p.publish(), Err(ProductError::MissingName));
        p.update_details(details("Lamp", dec!(-1)));
        assert_eq!(p.publish(), Err(ProductError::NegativePrice));
        assert_eq!(p.status, ProductStatus::Draft);
    }

    #[test]
    fn test_quote_uses_product_options() {
        let mut p = Product::create(Uuid::now_v7(), Sku::generate(), details("Shirt", dec!(100)));
        let color_id = Uuid::now_v7();
        p.colors.push(ProductColor {
            id: color_id, product_id: p.id, name: "Navy".into(), hex_code: "#000080".into(),
            price_adjustment: dec!(10), stock_quantity: 4, is_active: true,
        });
        p.variants.push(ProductVariant {
            id: Uuid::now_v7(), product_id: p.id, variant_name: "Size".into(), variant_value: "L".into(),
            price_adjustment: dec!(5), stock_quantity: 2,
        });
        let selection = PriceSelection {
            color_id: Some(color_id),
            variants: BTreeMap::from([("Size".to_string(), "L".to_string())]),
        };
        assert_eq!(p.quote(&selection).effective_price, dec!(115));
        assert_eq!(p.quote(&PriceSelection::default()).effective_price, dec!(100));
    }

    #[test]
    fn test_events_not_serialized() {
        let p = Product::create(Uuid::now_v7(), Sku::generate(), details("Mug", dec!(8)));
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("events").is_none());
        assert_eq!(json["status"], "draft");
        assert_eq!(json["stockQuantity"], 3);
    }
}
