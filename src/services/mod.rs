//! Application services orchestrating domain rules over the store.
pub mod discounts;

pub use discounts::DiscountService;
