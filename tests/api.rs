use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use storefront::domain::catalog::Color;
use storefront::storage::MemoryStore;
use storefront::{AppState, Config, EventPublisher};

const SELLER: &str = "seller-token";
const SHOPPER: &str = "shopper-token";
const OTHER: &str = "other-token";

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    async fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let expires = Utc::now() + Duration::hours(1);
        for token in [SELLER, SHOPPER, OTHER] {
            store.add_session(token, Uuid::now_v7(), expires).await;
        }
        let state = AppState::new(store.clone(), config, EventPublisher::disabled());
        Self { router: storefront::app(state), store }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder.header(CONTENT_TYPE, "application/json").body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    async fn create_product(&self, price: f64) -> String {
        let (status, body) = self
            .post("/api/products", SELLER, json!({"name": "Linen Shirt", "price": price, "stockQuantity": 5}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_discount(&self, body: Value) -> String {
        let (status, body) = self.post("/api/discounts", SELLER, body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

fn window() -> (String, String) {
    let now = Utc::now();
    ((now - Duration::days(1)).to_rfc3339(), (now + Duration::days(30)).to_rfc3339())
}

fn discount_body(name: &str, kind: &str, value: f64, scope: &str, extra: Value) -> Value {
    let (start, end) = window();
    let mut body = json!({
        "name": name,
        "type": kind,
        "value": value,
        "scope": scope,
        "startDate": start,
        "endDate": end,
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    body
}

fn names(available: &Value) -> Vec<String> {
    let mut names: Vec<String> = available["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["discount"]["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_available_discounts_require_session() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/discounts/available", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "error": "Authentication required"}));

    let (status, _) = app.get("/api/discounts/available", Some("expired-or-unknown")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_available_discounts_offer_coupon_backed_discounts_outside_the_cart() {
    let app = TestApp::new().await;
    let product_id = app.create_product(40.0).await;
    let unrelated = Uuid::now_v7();

    app.create_discount(discount_body("Shirt sale", "percentage", 10.0, "product", json!({"targetIds": [product_id]})))
        .await;
    let big_orders = app
        .create_discount(discount_body("Big orders", "fixed", 15.0, "order", json!({"minOrderAmount": 200.0})))
        .await;
    app.create_discount(discount_body("Other product", "fixed", 5.0, "product", json!({"targetIds": [unrelated]})))
        .await;

    let (status, body) = app
        .post(&format!("/api/discounts/{big_orders}/coupons"), SELLER, json!({"code": "bigspender", "usageLimit": 10}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["code"], "BIGSPENDER");

    let uri = format!("/api/discounts/available?orderAmount=50&productIds[]={product_id}");
    let (status, body) = app.get(&uri, Some(SHOPPER)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(names(&body), vec!["Big orders", "Shirt sale"]);

    let entries = body["data"].as_array().unwrap();
    let big = entries.iter().find(|d| d["discount"]["name"] == "Big orders").unwrap();
    assert_eq!(big["isApplicable"], false);
    assert_eq!(big["requiresCoupon"], true);
    assert_eq!(big["coupons"][0]["code"], "BIGSPENDER");

    let sale = entries.iter().find(|d| d["discount"]["name"] == "Shirt sale").unwrap();
    assert_eq!(sale["isApplicable"], true);
    assert_eq!(sale["requiresCoupon"], false);
    assert_eq!(sale["previewDiscountAmount"].as_f64(), Some(5.0));
}

#[tokio::test]
async fn test_available_discounts_preview_shipping_against_sample_cost() {
    let app = TestApp::new().await;
    app.create_discount(discount_body("Half shipping", "percentage", 50.0, "shipping", json!({}))).await;
    app.create_discount(discount_body("Shipping credit", "fixed", 25.0, "shipping", json!({}))).await;

    let (status, body) = app.get("/api/discounts/available?orderAmount=100", Some(SHOPPER)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let preview = |name: &str| {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["discount"]["name"] == name)
            .and_then(|d| d["previewDiscountAmount"].as_f64())
            .unwrap()
    };
    assert!((preview("Half shipping") - 4.995).abs() < 1e-9);
    assert!((preview("Shipping credit") - 9.99).abs() < 1e-9);
}

#[tokio::test]
async fn test_available_discounts_survive_a_failing_coupon_lookup() {
    let app = TestApp::new().await;
    let id = app.create_discount(discount_body("Storewide", "percentage", 5.0, "order", json!({}))).await;
    app.store.fail_coupon_lookups_for(id.parse().unwrap()).await;

    let (status, body) = app.get("/api/discounts/available?orderAmount=20", Some(SHOPPER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Storewide"]);
    assert_eq!(body["data"][0]["coupons"], json!([]));
}

#[tokio::test]
async fn test_available_discounts_reject_negative_order_amount() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/discounts/available?orderAmount=-1", Some(SHOPPER)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_available_discounts_reject_order_amount_beyond_money_range() {
    let app = TestApp::new().await;
    app.create_discount(discount_body("Half off", "percentage", 50.0, "order", json!({}))).await;

    let (status, body) = app
        .get("/api/discounts/available?orderAmount=79228162514264337593543950335", Some(SHOPPER))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app.get("/api/discounts/available?orderAmount=9999999999.99", Some(SHOPPER)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(names(&body), vec!["Half off"]);
}

#[tokio::test]
async fn test_create_discount_validation() {
    let app = TestApp::new().await;
    let (status, _) = app.post("/api/discounts", SELLER, discount_body("Too much", "percentage", 150.0, "order", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/discounts", SELLER, discount_body("No targets", "fixed", 5.0, "category", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_coupon_validate_and_redeem_until_exhausted() {
    let app = TestApp::new().await;
    let id = app.create_discount(discount_body("Launch", "fixed", 10.0, "order", json!({}))).await;
    let (status, _) = app
        .post(&format!("/api/discounts/{id}/coupons"), SELLER, json!({"code": "LAUNCH-1", "usageLimit": 1}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/coupons/validate", SHOPPER, json!({"code": " launch-1 "})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["discount"]["name"], "Launch");

    let (status, body) = app.post("/api/coupons/redeem", SHOPPER, json!({"code": "LAUNCH-1"})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["usedCount"], 1);

    let (status, body) = app.post("/api/coupons/redeem", OTHER, json!({"code": "LAUNCH-1"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = app.post("/api/coupons/validate", OTHER, json!({"code": "LAUNCH-1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/coupons/redeem", SHOPPER, json!({"code": "NOPE"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_coupon_code_conflicts() {
    let app = TestApp::new().await;
    let id = app.create_discount(discount_body("Launch", "fixed", 10.0, "order", json!({}))).await;
    let uri = format!("/api/discounts/{id}/coupons");
    let (status, _) = app.post(&uri, SELLER, json!({"code": "SAVE10", "usageLimit": 5})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post(&uri, SELLER, json!({"code": "save10", "usageLimit": 5})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_product_lifecycle_and_ownership() {
    let app = TestApp::new().await;
    let id = app.create_product(25.0).await;
    let uri = format!("/api/products/{id}");

    // Drafts are hidden from the public and from other users.
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.get("/api/products", None).await;
    assert_eq!(body["data"]["total"], 0);
    let (status, body) = app.get(&uri, Some(SELLER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "draft");

    let (status, _) = app.post(&format!("{uri}/publish"), OTHER, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&format!("{uri}/publish"), SELLER, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = app.get("/api/products?search=linen", None).await;
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = app.send(Method::DELETE, &uri, Some(OTHER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.send(Method::DELETE, &uri, Some(SELLER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "archived");

    let (_, body) = app.get("/api/products", None).await;
    assert_eq!(body["data"]["total"], 0);
    let (_, body) = app.get("/api/products/mine", Some(SELLER)).await;
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = app.post(&format!("{uri}/publish"), SELLER, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_price_quote_adds_color_and_variant_adjustments() {
    let app = TestApp::new().await;
    let id = app.create_product(100.0).await;

    let (status, body) = app
        .post(&format!("/api/products/{id}/colors"), SELLER, json!({"name": "Navy", "hexCode": "#001f3f", "priceAdjustment": 10.0}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["hexCode"], "#001F3F");
    let color_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(&format!("/api/products/{id}/variants"), SELLER, json!({"variantName": "Size", "variantValue": "L", "priceAdjustment": 5.0}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(&format!("/api/products/{id}/variants"), SELLER, json!({"variantName": "Size", "variantValue": "L"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(&format!("/api/products/{id}/price"), SELLER, json!({"colorId": color_id, "variants": {"Size": "L", "Fit": "Slim"}}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["effectivePrice"].as_f64(), Some(115.0));
    assert_eq!(body["data"]["colorAdjustment"].as_f64(), Some(10.0));
    assert_eq!(body["data"]["variantAdjustment"].as_f64(), Some(5.0));
}

#[tokio::test]
async fn test_money_fields_must_fit_two_decimal_places_and_range() {
    let app = TestApp::new().await;
    let (status, body) = app.post("/api/discounts", SELLER, discount_body("Thirds", "fixed", 33.333, "order", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    let (status, _) = app
        .post("/api/discounts", SELLER, discount_body("Capped", "percentage", 10.0, "order", json!({"maxDiscountAmount": 1e10})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/products", SELLER, json!({"name": "Yacht", "price": 1e10})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = app.create_product(12.5).await;
    let (status, _) = app
        .post(&format!("/api/products/{id}/colors"), SELLER, json!({"name": "Gold", "hexCode": "#FFD700", "priceAdjustment": 1e11}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(&format!("/api/products/{id}/variants"), SELLER, json!({"variantName": "Size", "variantValue": "S", "priceAdjustment": -2.505}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(&format!("/api/products/{id}/variants"), SELLER, json!({"variantName": "Size", "variantValue": "S", "priceAdjustment": -2.5}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_requests_get_the_error_envelope() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/products/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app.get("/api/colors?isActive=maybe", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app.post("/api/products", SELLER, json!({"name": "No price"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let id = app.create_product(10.0).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/products/{id}/images"))
        .header(AUTHORIZATION, format!("Bearer {SELLER}"))
        .body(Body::from("not multipart"))
        .unwrap();
    let (status, body) = app.dispatch(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_invalid_hex_color_is_rejected() {
    let app = TestApp::new().await;
    let id = app.create_product(10.0).await;
    let (status, _) = app
        .post(&format!("/api/products/{id}/colors"), SELLER, json!({"name": "Odd", "hexCode": "blue"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reviews_rating_bounds_and_average() {
    let app = TestApp::new().await;
    let id = app.create_product(10.0).await;
    app.post(&format!("/api/products/{id}/publish"), SELLER, json!({})).await;

    let (status, _) = app.post("/api/reviews", SHOPPER, json!({"type": "product", "targetId": id, "rating": 6})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.post("/api/reviews", SHOPPER, json!({"type": "product", "targetId": id, "rating": 0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for rating in [json!(300), json!(-1), json!(4.5)] {
        let (status, body) = app.post("/api/reviews", SHOPPER, json!({"type": "product", "targetId": id, "rating": rating})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating}");
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    for (token, rating) in [(SHOPPER, 5), (OTHER, 4)] {
        let (status, body) = app
            .post("/api/reviews", token, json!({"type": "product", "targetId": id, "rating": rating, "comment": "  "}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["data"]["comment"], Value::Null);
    }

    let (status, body) = app.get(&format!("/api/reviews/average?type=product&targetId={id}"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["average"].as_f64(), Some(4.5));
    assert_eq!(body["data"]["count"], 2);

    let (_, body) = app.get(&format!("/api/reviews?type=product&targetId={id}&perPage=1"), None).await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (_, body) = app.get(&format!("/api/reviews/average?type=shop&targetId={}", Uuid::now_v7()), None).await;
    assert_eq!(body["data"]["average"].as_f64(), Some(0.0));
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_palette_colors_filter_by_active_flag() {
    let app = TestApp::new().await;
    for (name, is_active) in [("Crimson", true), ("Sand", false)] {
        app.store
            .add_palette_color(Color { id: Uuid::now_v7(), name: name.into(), hex_code: "#AA0000".into(), is_active })
            .await;
    }
    let (_, body) = app.get("/api/colors", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let (_, body) = app.get("/api/colors?isActive=true", None).await;
    let active = body["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["name"], "Crimson");
}

#[tokio::test]
async fn test_categories() {
    let app = TestApp::new().await;
    let (status, body) = app.post("/api/categories", SELLER, json!({"name": "Home & Garden"})).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["slug"], "home-garden");
    let parent = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.post("/api/categories", SELLER, json!({"name": "Home garden"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.post("/api/categories", SELLER, json!({"name": "Lamps", "parentId": Uuid::now_v7()})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.post("/api/categories", SELLER, json!({"name": "Lamps", "parentId": parent})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get("/api/categories", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_shop_profiles() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(Method::PUT, "/api/shop-profiles", Some(SELLER), Some(json!({"username": "LinenHouse", "shopName": "Linen House"})))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["username"], "linenhouse");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let user_id = body["data"]["userId"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/shop-profiles/username/LINENHOUSE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    let (status, _) = app.get(&format!("/api/shop-profiles/id/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/shop-profiles/user/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/shop-profiles/username/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::PUT, "/api/shop-profiles", Some(OTHER), Some(json!({"username": "linenhouse", "shopName": "Copycat"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .send(Method::PUT, "/api/shop-profiles", Some(OTHER), Some(json!({"username": "9lives", "shopName": "Cats"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_upload_and_delete() {
    let upload_dir = std::env::temp_dir().join(format!("storefront-test-{}", Uuid::now_v7()));
    let app = TestApp::with_config(Config { upload_dir: upload_dir.clone(), ..Config::default() }).await;
    let id = app.create_product(10.0).await;

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"altText\"\r\n\r\nFront view\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"front.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n\
         --{boundary}--\r\n"
    );
    let request = |token: &str| {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/api/products/{id}/images"))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body.clone()))
            .unwrap()
    };

    let (status, _) = app.dispatch(request(OTHER)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.dispatch(request(SELLER)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["altText"], "Front view");
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(&format!("/uploads/products/{id}/")));
    let file = upload_dir.join(url.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(&file).unwrap(), b"PNGDATA");

    let image_id = body["data"]["id"].as_str().unwrap();
    let (status, _) = app.send(Method::DELETE, &format!("/api/products/{id}/images/{image_id}"), Some(SELLER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!file.exists());

    let _ = std::fs::remove_dir_all(&upload_dir);
}
