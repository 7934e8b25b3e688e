//! Effective price of a product for a chosen color and set of variant options.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::aggregates::{ProductColor, ProductVariant};

/// Exclusive upper bound on the magnitude of a stored amount (`NUMERIC(12, 2)`), 10^10.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Fits a money column exactly: at most two decimal places and below [`MAX_AMOUNT`].
pub fn is_storable_amount(value: &Decimal) -> bool {
    value.normalize().scale() <= 2 && value.abs() < MAX_AMOUNT
}

/// A shopper's option choices on a product page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSelection {
    pub color_id: Option<Uuid>,
    /// Variant name to chosen value, e.g. `Size -> L`.
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub base_price: Decimal,
    pub color_adjustment: Decimal,
    pub variant_adjustment: Decimal,
    /// Display price: the adjusted total, floored at zero, to two places.
    pub effective_price: Decimal,
}

/// Base price plus the color's adjustment plus the adjustment of every
/// selected `(name, value)` pair that names an existing variant. Selections
/// with no matching variant contribute nothing.
pub fn quote(
    base_price: Decimal,
    color: Option<&ProductColor>,
    variants: &[ProductVariant],
    selected: &BTreeMap<String, String>,
) -> PriceQuote {
    let color_adjustment = color.map_or(Decimal::ZERO, |c| c.price_adjustment);
    let variant_adjustment = selected
        .iter()
        .filter_map(|(name, value)| {
            variants
                .iter()
                .find(|v| v.variant_name == *name && v.variant_value == *value)
        })
        .map(|v| v.price_adjustment)
        .sum::<Decimal>();
    let total = base_price + color_adjustment + variant_adjustment;
    PriceQuote { base_price, color_adjustment, variant_adjustment, effective_price: display_price(total) }
}

pub fn display_price(total: Decimal) -> Decimal {
    total.max(Decimal::ZERO).round_dp(2)
}
