//! Environment-based configuration.
//!
//! Values come from process environment variables, with a `.env` file loaded
//! by `main` through `dotenvy` beforehand. Only `DATABASE_URL` is required.

use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::discount::DEFAULT_SAMPLE_SHIPPING_COST;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub nats_url: Option<String>,
    /// Root directory for uploaded product images, served at `/uploads`.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Shipping cost shipping-scoped discount previews are measured against.
    pub sample_shipping_cost: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_max_connections: 10,
            port: 8083,
            nats_url: None,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
            sample_shipping_cost: DEFAULT_SAMPLE_SHIPPING_COST,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            nats_url: lookup("NATS_URL").filter(|v| !v.trim().is_empty()),
            upload_dir: lookup("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            sample_shipping_cost: parse_or(&lookup, "SAMPLE_SHIPPING_COST", defaults.sample_shipping_cost)?,
        })
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap();
        assert_eq!(config.port, 8083);
        assert_eq!(config.sample_shipping_cost, DEFAULT_SAMPLE_SHIPPING_COST);
        assert!(config.nats_url.is_none());
    }

    #[test]
    fn test_database_url_required() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("PORT", "9000"),
            ("SAMPLE_SHIPPING_COST", "4.50"),
            ("NATS_URL", "nats://localhost:4222"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.sample_shipping_cost, Decimal::new(450, 2));
        assert_eq!(config.nats_url.as_deref(), Some("nats://localhost:4222"));

        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "x"), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
