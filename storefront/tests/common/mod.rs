// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::TestRequest;
use once_cell::sync::Lazy;

use storefront::config::AppConfig;
use storefront::db::{seed, MemoryRepository, Repository};
use storefront::state::AppState;

pub use storefront::db::seed::{SAMPLE_EMAIL, SAMPLE_PASSWORD, SAMPLE_PRODUCTS};

/// Builds the real router over `$state`.
macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(storefront::web::configure_app_routes),
    )
    .await
  };
}

/// Logs in through `POST /login` and returns the session cookie.
macro_rules! login {
  ($app:expr, $email:expr, $password:expr) => {{
    let resp = actix_web::test::call_service(&$app, common::login_request($email, $password).to_request()).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER, "login should redirect");
    common::session_cookie(&resp).expect("login sets a session cookie")
  }};
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn empty_state() -> AppState {
  setup_tracing();
  let repo: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
  AppState::new(repo, Arc::new(AppConfig::default()))
}

/// State with the sample catalog and the sample user loaded.
pub async fn seeded_state() -> AppState {
  let state = empty_state();
  seed::seed(&state).await.expect("seeding the memory repository");
  state
}

pub fn register_request(username: &str, email: &str, password: &str) -> TestRequest {
  TestRequest::post().uri("/register").set_form(&[
    ("username", username),
    ("email", email),
    ("password", password),
    ("confirm_password", password),
  ])
}

pub fn login_request(email: &str, password: &str) -> TestRequest {
  TestRequest::post()
    .uri("/login")
    .set_form(&[("email", email), ("password", password)])
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
  let name = AppConfig::default().session_cookie_name;
  resp
    .response()
    .cookies()
    .find(|cookie| cookie.name() == name)
    .map(|cookie| cookie.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
  resp
    .headers()
    .get(header::LOCATION)
    .and_then(|value| value.to_str().ok())
    .map(str::to_string)
}

pub fn flash_messages(body: &serde_json::Value) -> Vec<String> {
  body["flashes"]
    .as_array()
    .map(|flashes| {
      flashes
        .iter()
        .filter_map(|flash| flash["message"].as_str().map(str::to_string))
        .collect()
    })
    .unwrap_or_default()
}
