// storefront/src/services/cart_service.rs

//! Cart and checkout. A user's cart is their pending order; checkout places it.

use std::sync::Arc;

use orka::{ContextData, Orka};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::models::{CartLine, Order, OrderItem};
use crate::pipelines::contexts::{AddToCartCtxData, CheckoutCtxData};
use crate::pipelines::run_to_completion;

/// A placed (or pending) order together with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
}

#[derive(Clone)]
pub struct CartService {
  repo: Arc<dyn Repository>,
  orka: Arc<Orka<AppError>>,
}

impl CartService {
  pub fn new(repo: Arc<dyn Repository>, orka: Arc<Orka<AppError>>) -> Self {
    Self { repo, orka }
  }

  /// Adds one line for `product_id`. Repeated adds create repeated lines.
  #[instrument(name = "cart_service::add_to_cart", skip(self), err(Display))]
  pub async fn add_to_cart(&self, user_id: i64, product_id: i64) -> Result<OrderItem> {
    let ctx_data = ContextData::new(AddToCartCtxData::new(self.repo.clone(), user_id, product_id));
    run_to_completion(&self.orka, &ctx_data, "add_to_cart").await?;

    let added_item = ctx_data.read().added_item.clone();
    added_item.ok_or_else(|| AppError::Internal("Add-to-cart completed without an item.".to_string()))
  }

  #[instrument(name = "cart_service::view_cart", skip(self))]
  pub async fn view_cart(&self, user_id: i64) -> Result<Vec<CartLine>> {
    self.repo.cart_lines(user_id).await
  }

  /// Places the pending order. Totals and stock are not checked.
  #[instrument(name = "cart_service::checkout", skip(self), err(Display))]
  pub async fn checkout(&self, user_id: i64) -> Result<Order> {
    let ctx_data = ContextData::new(CheckoutCtxData::new(self.repo.clone(), user_id));
    run_to_completion(&self.orka, &ctx_data, "checkout").await?;

    let (placed_order, item_count) = {
      let guard = ctx_data.read();
      (guard.placed_order.clone(), guard.item_count)
    };
    debug!(item_count, "Checkout pipeline finished.");
    placed_order.ok_or_else(|| AppError::Internal("Checkout completed without an order.".to_string()))
  }

  pub async fn order_history(&self, user_id: i64) -> Result<Vec<OrderSummary>> {
    let orders = self.repo.list_orders(user_id).await?;
    let mut summaries = Vec::with_capacity(orders.len());
    for order in orders {
      let items = self.repo.order_items(order.id).await?;
      summaries.push(OrderSummary { order, items });
    }
    Ok(summaries)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::MemoryRepository;
  use crate::models::{NewProduct, OrderStatus};
  use crate::pipelines::build_registry;

  async fn cart_with_catalog() -> CartService {
    let repo = Arc::new(MemoryRepository::new());
    repo
      .insert_product(NewProduct {
        name: "Keyboard".to_string(),
        price_cents: 4_999,
      })
      .await
      .unwrap();
    CartService::new(repo, build_registry())
  }

  #[tokio::test]
  async fn same_product_twice_gives_two_lines() {
    let cart = cart_with_catalog().await;
    let a = cart.add_to_cart(1, 1).await.unwrap();
    let b = cart.add_to_cart(1, 1).await.unwrap();
    assert_ne!(a.id, b.id);

    let lines = cart.view_cart(1).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.product_id == 1 && l.name == "Keyboard"));
  }

  #[tokio::test]
  async fn unknown_product_is_not_added() {
    let cart = cart_with_catalog().await;
    let err = cart.add_to_cart(1, 99).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(cart.view_cart(1).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn carts_are_per_user() {
    let cart = cart_with_catalog().await;
    cart.add_to_cart(1, 1).await.unwrap();
    assert!(cart.view_cart(2).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn checkout_keeps_lines_on_the_placed_order() {
    let cart = cart_with_catalog().await;
    cart.add_to_cart(1, 1).await.unwrap();
    cart.add_to_cart(1, 1).await.unwrap();

    let order = cart.checkout(1).await.unwrap();
    assert_eq!(order.status, OrderStatus::Placed);

    let history = cart.order_history(1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].order.id, order.id);
    assert_eq!(history[0].items.len(), 2);
    assert!(cart.view_cart(1).await.unwrap().is_empty());
  }
}
