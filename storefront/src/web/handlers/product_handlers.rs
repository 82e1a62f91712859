// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use super::current_user_view;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::session::Session;

#[instrument(name = "handler::index", skip(app_state, session))]
pub async fn index_handler(app_state: web::Data<AppState>, session: Session) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.list_products().await?;
  let current_user = current_user_view(&app_state, &session).await?;

  Ok(HttpResponse::Ok().json(json!({
      "products": products,
      "current_user": current_user,
      "flashes": session.take_flashes(),
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, session, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  session: Session,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = app_state.catalog.get_product(product_id).await?;
  let current_user = current_user_view(&app_state, &session).await?;
  info!("Product {} fetched successfully.", product_id);

  Ok(HttpResponse::Ok().json(json!({
      "title": product.name,
      "product": product,
      "current_user": current_user,
      "flashes": session.take_flashes(),
  })))
}

pub async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}
