//! Merchant shop profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Username;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: Username,
    pub shop_name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner-editable profile fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ShopDetails {
    pub username: Username,
    pub shop_name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
}

impl ShopProfile {
    /// Applies `details` to the user's existing profile, or opens a new one.
    pub fn upsert(existing: Option<ShopProfile>, user_id: Uuid, details: ShopDetails) -> Self {
        let now = Utc::now();
        let (id, created_at) = existing.map_or((Uuid::now_v7(), now), |p| (p.id, p.created_at));
        Self {
            id,
            user_id,
            username: details.username,
            shop_name: details.shop_name,
            description: details.description,
            logo_url: details.logo_url,
            banner_url: details.banner_url,
            created_at,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(username: &str) -> ShopDetails {
        ShopDetails {
            username: Username::new(username).unwrap(),
            shop_name: "Corner Store".into(),
            description: None,
            logo_url: None,
            banner_url: None,
        }
    }

    #[test]
    fn test_upsert_keeps_identity() {
        let user = Uuid::now_v7();
        let first = ShopProfile::upsert(None, user, details("corner"));
        let second = ShopProfile::upsert(Some(first.clone()), user, details("corner-store"));
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.username.as_str(), "corner-store");
    }
}
