// storefront/src/errors.rs

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use orka::OrkaError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::json;
use thiserror::Error;

/// Characters left readable in the `next` query value. Everything else,
/// including `?`, `&` and `=` of the original query, is escaped.
const NEXT_PARAM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'/').remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// Raised by the `CurrentUser` extractor. The response is a redirect to the
  /// login page; `session_cookie` is set when a session had to be created to
  /// hold the "please log in" flash.
  #[error("Login required to access {next}")]
  LoginRequired {
    next: String,
    session_cookie: Option<Cookie<'static>>,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Database Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Orka Workflow Error: {source}")]
  Workflow {
    #[from]
    source: OrkaError,
  },

  /// A pipeline handler returned `PipelineControl::Stop` where the caller
  /// needed the workflow to run to completion.
  #[error("Pipeline '{0}' was halted by a handler.")]
  PipelineHalted(&'static str),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

/// Builds the login redirect target, carrying `next` as an encoded query value.
pub fn login_location(next: &str) -> String {
  format!("/login?next={}", utf8_percent_encode(next, NEXT_PARAM))
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::LoginRequired { .. } => StatusCode::SEE_OTHER,
      AppError::PipelineHalted(_) => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migration(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    match self {
      AppError::LoginRequired { next, session_cookie } => {
        tracing::info!(next = %next, "Redirecting anonymous request to login");
        let mut builder = HttpResponse::SeeOther();
        builder.insert_header((header::LOCATION, login_location(next)));
        if let Some(cookie) = session_cookie {
          builder.cookie(cookie.clone());
        }
        builder.finish()
      }
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) => {
        tracing::warn!(application_error = %self, "Responding with client error");
        HttpResponse::build(self.status_code()).json(json!({ "error": m }))
      }
      AppError::Sqlx(_) | AppError::Migration(_) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({ "error": "Database operation failed" }))
      }
      AppError::Workflow { source } => {
        tracing::error!(orka_error_source = ?source, "Workflow error details");
        HttpResponse::InternalServerError().json(json!({ "error": "Workflow processing error", "detail": source.to_string() }))
      }
      AppError::PipelineHalted(pipeline) => {
        tracing::warn!(pipeline, "Responding to a halted pipeline");
        HttpResponse::Conflict().json(json!({ "error": "Process halted by business logic." }))
      }
      AppError::Config(m) | AppError::Internal(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({ "error": "An internal error occurred", "detail": m }))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn login_required_redirects_with_next() {
    let err = AppError::LoginRequired {
      next: "/cart".to_string(),
      session_cookie: None,
    };
    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
      resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
      Some("/login?next=/cart")
    );
  }

  #[test]
  fn login_location_encodes_the_original_query() {
    assert_eq!(login_location("/add_to_cart/3"), "/login?next=/add_to_cart/3");
    assert_eq!(login_location("/cart?view=full&x=1"), "/login?next=/cart%3Fview%3Dfull%26x%3D1");
    assert_eq!(login_location("/product/caf\u{e9}"), "/login?next=/product/caf%C3%A9");
  }

  #[test]
  fn workflow_errors_are_server_errors() {
    let err: AppError = OrkaError::HandlerMissing {
      step_name: "place_pending_order".to_string(),
    }
    .into();
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(AppError::PipelineHalted("checkout").status_code(), StatusCode::CONFLICT);
  }

  #[test]
  fn client_errors_map_to_their_status() {
    assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Auth("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn anyhow_wrapping_sqlx_is_unwrapped() {
    let err: AppError = anyhow::Error::new(sqlx::Error::RowNotFound).into();
    assert!(matches!(err, AppError::Sqlx(sqlx::Error::RowNotFound)));

    let err: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(err, AppError::Internal(ref m) if m == "boom"));
  }
}
