// storefront/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod cart_handlers;
pub mod product_handlers;

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, Either, HttpResponse};
use serde::Serialize;

use crate::errors::Result;
use crate::state::AppState;
use crate::web::session::Session;

/// POST bodies arrive either as an HTML form or as JSON.
pub type FormOrJson<T> = Either<web::Form<T>, web::Json<T>>;

pub fn into_payload<T>(body: FormOrJson<T>) -> T {
  match body {
    Either::Left(form) => form.into_inner(),
    Either::Right(json) => json.into_inner(),
  }
}

/// 303 to `location`, setting the session cookie if the handler changed it.
pub fn redirect(location: &str, cookie: Option<Cookie<'static>>) -> HttpResponse {
  let mut builder = HttpResponse::SeeOther();
  builder.insert_header((header::LOCATION, location.to_string()));
  if let Some(cookie) = cookie {
    builder.cookie(cookie);
  }
  builder.finish()
}

#[derive(Debug, Serialize)]
pub struct CurrentUserView {
  pub id: i64,
  pub username: String,
}

/// The logged-in user as page chrome sees it. A session pointing at a user
/// that no longer exists renders as anonymous.
pub async fn current_user_view(state: &AppState, session: &Session) -> Result<Option<CurrentUserView>> {
  let Some(user_id) = session.user_id() else {
    return Ok(None);
  };
  Ok(state.auth.find_user(user_id).await?.map(|user| CurrentUserView {
    id: user.id,
    username: user.username,
  }))
}
