//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock keeping unit, unique per product. Stored upper-case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 50 { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }

    /// Random `SKU-XXXXXXXX` identifier for products created without one.
    pub fn generate() -> Self { Self(format!("SKU-{:08}", rand::random::<u32>() % 100_000_000)) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SkuError { Empty, TooLong }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => f.write_str("sku must not be blank"), Self::TooLong => f.write_str("sku must be at most 50 characters") }
    }
}

/// URL slug derived from a display name: lowercase ASCII alphanumerics
/// separated by single hyphens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    pub fn from_name(name: &str) -> Option<Self> {
        let mut slug = String::with_capacity(name.len());
        for c in name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        while slug.ends_with('-') { slug.pop(); }
        if slug.is_empty() { None } else { Some(Self(slug)) }
    }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

/// Star rating, 1 through 5 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) { Ok(Self(value)) } else { Err(RatingError(value)) }
    }
    pub fn value(&self) -> u8 { self.0 }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;
    fn try_from(value: u8) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> u8 { r.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub struct RatingError(pub u8);
impl std::error::Error for RatingError {}
impl fmt::Display for RatingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rating must be between 1 and 5, got {}", self.0)
    }
}

/// Public shop handle.
///
/// 3-50 characters of ASCII letters, digits, `_` or `-`, starting with a
/// letter. Stored lowercase so lookups are case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: &str) -> Result<Self, UsernameError> {
        let trimmed = value.trim();
        if trimmed.len() < 3 || trimmed.len() > 50 { return Err(UsernameError::Length); }
        if !trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) { return Err(UsernameError::LeadingCharacter); }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(UsernameError::Characters);
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum UsernameError { Length, LeadingCharacter, Characters }
impl std::error::Error for UsernameError {}
impl fmt::Display for UsernameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "username must be 3-50 characters"),
            Self::LeadingCharacter => write!(f, "username must start with a letter"),
            Self::Characters => write!(f, "username may only contain letters, digits, '_' and '-'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_sku() { let sku = Sku::new("prod-001").unwrap(); assert_eq!(sku.as_str(), "PROD-001"); }
    #[test]
    fn test_sku_rejects_blank() { assert_eq!(Sku::new("   "), Err(SkuError::Empty)); }
    #[test]
    fn test_generated_sku_is_valid() {
        let sku = Sku::generate();
        assert!(sku.as_str().starts_with("SKU-"));
        assert_eq!(Sku::new(sku.as_str()).unwrap(), sku);
    }
    #[test]
    fn test_slug() {
        assert_eq!(Slug::from_name("  Summer Dresses & Skirts ").unwrap().as_str(), "summer-dresses-skirts");
        assert!(Slug::from_name("!!!").is_none());
    }
    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert!(serde_json::from_str::<Rating>("6").is_err());
        assert_eq!(serde_json::to_string(&Rating::new(3).unwrap()).unwrap(), "3");
    }
    #[test]
    fn test_username() {
        assert_eq!(Username::new("Alice_Shop").unwrap().as_str(), "alice_shop");
        assert_eq!(Username::new("ab"), Err(UsernameError::Length));
        assert_eq!(Username::new("1shop"), Err(UsernameError::LeadingCharacter));
        assert_eq!(Username::new("shop owner"), Err(UsernameError::Characters));
    }
}
