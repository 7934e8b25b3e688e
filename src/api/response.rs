//! The `{ success, data | error }` envelope every JSON response uses.

use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data: Some(data), error: None })
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }
}

pub type ApiResult<T> = crate::Result<Json<ApiResponse<T>>>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    /// `(page, per_page)`: page at least 1, per_page 1-100, default 20.
    pub fn resolve(&self) -> (u32, u32) {
        (self.page.unwrap_or(1).max(1), self.per_page.unwrap_or(20).clamp(1, 100))
    }

    pub fn limit_offset(&self) -> (i64, i64) {
        let (page, per_page) = self.resolve();
        (i64::from(per_page), i64::from(page - 1) * i64::from(per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let ok = serde_json::to_value(ApiResponse::ok(vec![1, 2]).0).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": [1, 2]}));
        let err = serde_json::to_value(ApiResponse::error("Authentication required")).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "Authentication required"}));
    }

    #[test]
    fn test_page_params() {
        let p = PageParams { page: Some(0), per_page: Some(500) };
        assert_eq!(p.resolve(), (1, 100));
        let p = PageParams { page: Some(3), per_page: None };
        assert_eq!(p.limit_offset(), (20, 40));
    }
}
