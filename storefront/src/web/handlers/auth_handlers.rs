// storefront/src/web/handlers/auth_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{into_payload, redirect, FormOrJson};
use crate::errors::AppError;
use crate::services::{Flash, FlashCategory, Registration};
use crate::state::AppState;
use crate::web::session::{safe_next, Session};

pub const ACCOUNT_CREATED_MESSAGE: &str = "Your account has been created! You can now log in.";

// --- Request DTOs ---
// Every field defaults so that a missing one reaches validation instead of
// failing deserialization.

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RegisterRequestPayload {
  pub username: String,
  pub email: String,
  pub password: String,
  pub confirm_password: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
  #[serde(deserialize_with = "deserialize_checkbox")]
  pub remember: bool,
}

#[derive(Deserialize, Debug)]
pub struct LoginQuery {
  pub next: Option<String>,
}

/// HTML checkboxes post `y`/`on`; JSON clients send a bool.
fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Checkbox {
    Bool(bool),
    Text(String),
  }

  Ok(match Checkbox::deserialize(deserializer)? {
    Checkbox::Bool(checked) => checked,
    Checkbox::Text(text) => matches!(text.to_ascii_lowercase().as_str(), "y" | "yes" | "on" | "true" | "1"),
  })
}

// --- Handler Implementations ---

#[instrument(name = "handler::register_form", skip(session))]
pub async fn register_form_handler(session: Session) -> HttpResponse {
  if session.is_authenticated() {
    return redirect("/", None);
  }
  HttpResponse::Ok().json(json!({
      "title": "Register",
      "form": { "username": "", "email": "" },
      "errors": [],
      "flashes": session.take_flashes(),
  }))
}

#[instrument(name = "handler::register", skip(app_state, session, body))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  mut session: Session,
  body: FormOrJson<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if session.is_authenticated() {
    return Ok(redirect("/", None));
  }
  let payload = into_payload(body);
  let (username, email) = (payload.username.clone(), payload.email.clone());

  let registration = Registration {
    username: payload.username,
    email: payload.email,
    password: payload.password,
    confirm_password: payload.confirm_password,
  };

  match app_state.auth.register(registration).await {
    Ok(user) => {
      info!(user_id = user.id, "Registration successful.");
      let cookie = session.flash(FlashCategory::Success, ACCOUNT_CREATED_MESSAGE);
      Ok(redirect("/login", cookie))
    }
    Err(AppError::Validation(message)) => {
      warn!("Registration rejected: {}", message);
      // Re-render the form with what the user typed, minus the password.
      Ok(HttpResponse::BadRequest().json(json!({
          "title": "Register",
          "form": { "username": username, "email": email },
          "errors": [message],
          "flashes": session.take_flashes(),
      })))
    }
    Err(other) => Err(other),
  }
}

#[instrument(name = "handler::login_form", skip(session))]
pub async fn login_form_handler(session: Session) -> HttpResponse {
  if session.is_authenticated() {
    return redirect("/", None);
  }
  HttpResponse::Ok().json(json!({
      "title": "Login",
      "form": { "email": "", "remember": false },
      "flashes": session.take_flashes(),
  }))
}

#[instrument(name = "handler::login", skip(app_state, session, body, query))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  mut session: Session,
  query: web::Query<LoginQuery>,
  body: FormOrJson<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if session.is_authenticated() {
    return Ok(redirect("/", None));
  }
  let payload = into_payload(body);

  match app_state.auth.authenticate(&payload.email, &payload.password).await {
    Ok(user) => {
      let cookie = session.login(user.id, payload.remember);
      let next = safe_next(query.next.as_deref());
      info!(user_id = user.id, next = %next, "Login successful.");
      Ok(redirect(&next, Some(cookie)))
    }
    Err(AppError::Auth(message)) => Ok(login_failed(StatusCode::UNAUTHORIZED, message, &session, &payload)),
    Err(AppError::Validation(message)) => Ok(login_failed(StatusCode::BAD_REQUEST, message, &session, &payload)),
    Err(other) => Err(other),
  }
}

/// Re-renders the login form with the failure as a `danger` flash. No
/// session is created.
fn login_failed(status: StatusCode, message: String, session: &Session, payload: &LoginRequestPayload) -> HttpResponse {
  warn!("Login failed: {}", message);
  let mut flashes = session.take_flashes();
  flashes.push(Flash::new(FlashCategory::Danger, message));
  HttpResponse::build(status).json(json!({
      "title": "Login",
      "form": { "email": payload.email, "remember": payload.remember },
      "flashes": flashes,
  }))
}

#[instrument(name = "handler::logout", skip(session))]
pub async fn logout_handler(mut session: Session) -> HttpResponse {
  let user_id = session.user_id();
  let cookie = session.logout();
  info!(?user_id, "Logged out.");
  redirect("/", Some(cookie))
}
