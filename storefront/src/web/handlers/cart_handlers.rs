// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use super::redirect;
use crate::errors::AppError;
use crate::services::FlashCategory;
use crate::state::AppState;
use crate::web::session::CurrentUser;

pub const ADDED_TO_CART_MESSAGE: &str = "Product added to cart.";
pub const ORDER_PLACED_MESSAGE: &str = "Your order has been placed!";

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, auth_user, path),
    fields(user_id = %auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  mut auth_user: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let item = app_state.cart.add_to_cart(auth_user.user_id, path.into_inner()).await?;
  info!(item_id = item.id, order_id = item.order_id, "Add to cart successful.");

  let cookie = auth_user.session.flash(FlashCategory::Success, ADDED_TO_CART_MESSAGE);
  Ok(redirect("/", cookie))
}

#[instrument(name = "handler::view_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn view_cart_handler(app_state: web::Data<AppState>, auth_user: CurrentUser) -> Result<HttpResponse, AppError> {
  let lines = app_state.cart.view_cart(auth_user.user_id).await?;
  let total_cents: i64 = lines.iter().map(|line| line.price_cents).sum();

  Ok(HttpResponse::Ok().json(json!({
      "title": "Cart",
      "items": lines,
      "total_cents": total_cents,
      "flashes": auth_user.session.take_flashes(),
  })))
}

#[instrument(name = "handler::checkout", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn checkout_handler(app_state: web::Data<AppState>, mut auth_user: CurrentUser) -> Result<HttpResponse, AppError> {
  let order = app_state.cart.checkout(auth_user.user_id).await?;
  info!(order_id = order.id, "Checkout completed.");

  let cookie = auth_user.session.flash(FlashCategory::Success, ORDER_PLACED_MESSAGE);
  Ok(redirect("/", cookie))
}

#[instrument(name = "handler::order_history", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn order_history_handler(
  app_state: web::Data<AppState>,
  auth_user: CurrentUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.cart.order_history(auth_user.user_id).await?;

  Ok(HttpResponse::Ok().json(json!({
      "title": "Orders",
      "orders": orders,
      "flashes": auth_user.session.take_flashes(),
  })))
}
