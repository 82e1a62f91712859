// storefront/src/web/session.rs

//! Request extractors over the server-side session store.

use std::sync::Arc;

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::{Flash, FlashCategory, SessionStore};
use crate::state::AppState;

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// The visitor's session, anonymous or not. Cookie changes are returned to
/// the handler, which attaches them to its response.
#[derive(Debug)]
pub struct Session {
  sessions: SessionStore,
  config: Arc<AppConfig>,
  token: Option<String>,
  user_id: Option<i64>,
}

impl Session {
  fn from_http_request(req: &HttpRequest) -> Result<Self> {
    let state = req
      .app_data::<web::Data<AppState>>()
      .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

    let mut session = Session {
      sessions: state.sessions.clone(),
      config: state.config.clone(),
      token: None,
      user_id: None,
    };

    if let Some(cookie) = req.cookie(&state.config.session_cookie_name) {
      let token = cookie.value().to_string();
      if let Some(info) = state.sessions.lookup(&token) {
        session.user_id = info.user_id;
        session.token = Some(token);
      }
    }
    Ok(session)
  }

  pub fn user_id(&self) -> Option<i64> {
    self.user_id
  }

  pub fn is_authenticated(&self) -> bool {
    self.user_id.is_some()
  }

  /// Binds the session to `user_id` under a fresh token.
  pub fn login(&mut self, user_id: i64, remember: bool) -> Cookie<'static> {
    let token = self.sessions.rotate(self.token.as_deref(), user_id, remember);
    self.user_id = Some(user_id);
    self.token = Some(token.clone());
    self.cookie(token, remember)
  }

  /// Drops the server record and returns a cookie that expires the client's.
  pub fn logout(&mut self) -> Cookie<'static> {
    if let Some(token) = self.token.take() {
      self.sessions.destroy(&token);
    }
    self.user_id = None;
    let mut cookie = Cookie::build(self.config.session_cookie_name.clone(), "")
      .path("/")
      .finish();
    cookie.make_removal();
    cookie
  }

  /// Queues a flash message. A new session is opened for anonymous visitors,
  /// in which case its cookie is returned.
  pub fn flash(&mut self, category: FlashCategory, message: impl Into<String>) -> Option<Cookie<'static>> {
    let flash = Flash::new(category, message);
    if let Some(token) = &self.token {
      if self.sessions.push_flash(token, flash.clone()) {
        return None;
      }
    }
    let token = self.sessions.create(self.user_id, false);
    self.sessions.push_flash(&token, flash);
    self.token = Some(token.clone());
    Some(self.cookie(token, false))
  }

  pub fn take_flashes(&self) -> Vec<Flash> {
    match &self.token {
      Some(token) => self.sessions.take_flashes(token),
      None => Vec::new(),
    }
  }

  fn cookie(&self, token: String, remember: bool) -> Cookie<'static> {
    let mut builder = Cookie::build(self.config.session_cookie_name.clone(), token)
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .secure(self.config.session_cookie_secure);
    if remember {
      builder = builder.max_age(CookieDuration::seconds(self.sessions.remember_ttl().num_seconds()));
    }
    builder.finish()
  }
}

impl FromRequest for Session {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(Session::from_http_request(req))
  }
}

/// A logged-in visitor. Anonymous requests are redirected to the login page
/// with an `info` flash.
#[derive(Debug)]
pub struct CurrentUser {
  pub user_id: i64,
  pub session: Session,
}

impl FromRequest for CurrentUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let result = Session::from_http_request(req).and_then(|mut session| match session.user_id() {
      Some(user_id) => Ok(CurrentUser { user_id, session }),
      None => {
        warn!(path = %req.path(), "Anonymous access to a login-only route.");
        let next = req
          .uri()
          .path_and_query()
          .map(|pq| pq.as_str())
          .unwrap_or_else(|| req.path());
        let session_cookie = session.flash(FlashCategory::Info, LOGIN_REQUIRED_MESSAGE);
        Err(AppError::LoginRequired {
          next: next.to_string(),
          session_cookie,
        })
      }
    });
    ready(result)
  }
}

/// Keeps post-login redirects on this site: only paths with a single leading
/// slash are accepted.
pub fn safe_next(next: Option<&str>) -> String {
  match next {
    Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path.to_string(),
    _ => "/".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn safe_next_only_allows_local_paths() {
    assert_eq!(safe_next(Some("/cart")), "/cart");
    assert_eq!(safe_next(Some("/add_to_cart/3")), "/add_to_cart/3");
    assert_eq!(safe_next(None), "/");
    assert_eq!(safe_next(Some("")), "/");
    assert_eq!(safe_next(Some("https://evil.example")), "/");
    assert_eq!(safe_next(Some("//evil.example")), "/");
    assert_eq!(safe_next(Some("/\\evil.example")), "/");
  }
}
