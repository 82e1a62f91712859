// tests/catalog_tests.rs
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use common::*;

#[actix_web::test]
async fn test_index_lists_every_product() {
  let state = seeded_state().await;
  let app = init_app!(state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: serde_json::Value = test::read_body_json(resp).await;

  let names: Vec<&str> = body["products"]
    .as_array()
    .unwrap()
    .iter()
    .filter_map(|p| p["name"].as_str())
    .collect();
  let expected: Vec<&str> = SAMPLE_PRODUCTS.iter().map(|(name, _)| *name).collect();
  assert_eq!(names, expected);
  assert!(body["current_user"].is_null());
  assert!(body["flashes"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_product_detail() {
  let state = seeded_state().await;
  let app = init_app!(state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/product/7").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(body["product"]["name"], "Monitor");
  assert_eq!(body["product"]["price_cents"], 24_999);
}

#[actix_web::test]
async fn test_missing_product_is_not_found() {
  let state = seeded_state().await;
  let app = init_app!(state);

  for uri in ["/product/999", "/product/0", "/product/abc"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
  }
}

#[actix_web::test]
async fn test_health_check() {
  let state = empty_state();
  let app = init_app!(state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "ok");
}
