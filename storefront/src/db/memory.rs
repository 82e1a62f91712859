// storefront/src/db/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

use super::{Repository, DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USERNAME_MESSAGE};
use crate::errors::{AppError, Result};
use crate::models::{CartLine, NewProduct, NewUser, Order, OrderItem, OrderStatus, Product, User};

#[derive(Debug, Default)]
struct Tables {
  users: Vec<User>,
  products: Vec<Product>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
  last_user_id: i64,
  last_product_id: i64,
  last_order_id: i64,
  last_order_item_id: i64,
}

impl Tables {
  fn pending_order_id(&self, user_id: i64) -> Option<i64> {
    self
      .orders
      .iter()
      .find(|o| o.user_id == user_id && o.status == OrderStatus::Pending)
      .map(|o| o.id)
  }

  fn open_order(&mut self, user_id: i64, status: OrderStatus) -> Order {
    self.last_order_id += 1;
    let now = Utc::now();
    let order = Order {
      id: self.last_order_id,
      user_id,
      status,
      created_at: now,
      placed_at: (status == OrderStatus::Placed).then_some(now),
    };
    self.orders.push(order.clone());
    order
  }
}

/// Process-local repository. Ids are assigned sequentially from 1, the same
/// way `BIGSERIAL` columns do after a reset.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Repository for MemoryRepository {
  async fn insert_user(&self, new_user: NewUser) -> Result<User> {
    let mut tables = self.tables.write();
    if tables.users.iter().any(|u| u.username == new_user.username) {
      return Err(AppError::Validation(DUPLICATE_USERNAME_MESSAGE.to_string()));
    }
    if tables.users.iter().any(|u| u.email == new_user.email) {
      return Err(AppError::Validation(DUPLICATE_EMAIL_MESSAGE.to_string()));
    }
    tables.last_user_id += 1;
    let user = User {
      id: tables.last_user_id,
      username: new_user.username,
      email: new_user.email,
      password_hash: new_user.password_hash,
      created_at: Utc::now(),
    };
    tables.users.push(user.clone());
    Ok(user)
  }

  async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.id == user_id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.email == email).cloned())
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.username == username).cloned())
  }

  async fn insert_product(&self, new_product: NewProduct) -> Result<Product> {
    let mut tables = self.tables.write();
    tables.last_product_id += 1;
    let product = Product {
      id: tables.last_product_id,
      name: new_product.name,
      price_cents: new_product.price_cents,
      created_at: Utc::now(),
    };
    tables.products.push(product.clone());
    Ok(product)
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    Ok(self.tables.read().products.clone())
  }

  async fn find_product(&self, product_id: i64) -> Result<Option<Product>> {
    Ok(self.tables.read().products.iter().find(|p| p.id == product_id).cloned())
  }

  async fn add_order_item(&self, user_id: i64, product_id: i64) -> Result<OrderItem> {
    let mut tables = self.tables.write();
    if !tables.products.iter().any(|p| p.id == product_id) {
      return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
    }
    let order_id = match tables.pending_order_id(user_id) {
      Some(id) => id,
      None => tables.open_order(user_id, OrderStatus::Pending).id,
    };
    tables.last_order_item_id += 1;
    let item = OrderItem {
      id: tables.last_order_item_id,
      order_id,
      product_id,
      added_at: Utc::now(),
    };
    tables.order_items.push(item.clone());
    Ok(item)
  }

  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>> {
    let tables = self.tables.read();
    let Some(order_id) = tables.pending_order_id(user_id) else {
      return Ok(Vec::new());
    };
    let lines = tables
      .order_items
      .iter()
      .filter(|item| item.order_id == order_id)
      .filter_map(|item| {
        tables.products.iter().find(|p| p.id == item.product_id).map(|p| CartLine {
          item_id: item.id,
          product_id: p.id,
          name: p.name.clone(),
          price_cents: p.price_cents,
          added_at: item.added_at,
        })
      })
      .collect();
    Ok(lines)
  }

  async fn place_order(&self, user_id: i64) -> Result<Order> {
    let mut tables = self.tables.write();
    let pending = tables
      .orders
      .iter_mut()
      .find(|o| o.user_id == user_id && o.status == OrderStatus::Pending);
    match pending {
      Some(order) => {
        order.status = OrderStatus::Placed;
        order.placed_at = Some(Utc::now());
        Ok(order.clone())
      }
      None => Ok(tables.open_order(user_id, OrderStatus::Placed)),
    }
  }

  async fn list_orders(&self, user_id: i64) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(tables.orders.iter().rev().filter(|o| o.user_id == user_id).cloned().collect())
  }

  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
    let tables = self.tables.read();
    Ok(tables.order_items.iter().filter(|i| i.order_id == order_id).cloned().collect())
  }

  async fn reset(&self) -> Result<()> {
    *self.tables.write() = Tables::default();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
      username: username.to_string(),
      email: email.to_string(),
      password_hash: "hash".to_string(),
    }
  }

  async fn repo_with_product() -> (MemoryRepository, Product) {
    let repo = MemoryRepository::new();
    let product = repo
      .insert_product(NewProduct {
        name: "Mouse".to_string(),
        price_cents: 2999,
      })
      .await
      .unwrap();
    (repo, product)
  }

  #[tokio::test]
  async fn duplicate_username_and_email_are_rejected() {
    let repo = MemoryRepository::new();
    repo.insert_user(new_user("alice", "alice@example.com")).await.unwrap();

    let err = repo.insert_user(new_user("alice", "other@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == DUPLICATE_USERNAME_MESSAGE));

    let err = repo.insert_user(new_user("bob", "alice@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == DUPLICATE_EMAIL_MESSAGE));
  }

  #[tokio::test]
  async fn order_items_attach_to_a_real_pending_order() {
    let (repo, product) = repo_with_product().await;
    // Two users so user ids and order ids diverge.
    repo.insert_user(new_user("alice", "alice@example.com")).await.unwrap();
    let bob = repo.insert_user(new_user("bob", "bob@example.com")).await.unwrap();

    let first = repo.add_order_item(bob.id, product.id).await.unwrap();
    let second = repo.add_order_item(bob.id, product.id).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.order_id, second.order_id);
    let orders = repo.list_orders(bob.id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, first.order_id);
    assert_eq!(orders[0].status, OrderStatus::Pending);
  }

  #[tokio::test]
  async fn placing_an_order_starts_a_fresh_cart() {
    let (repo, product) = repo_with_product().await;
    repo.add_order_item(1, product.id).await.unwrap();

    let placed = repo.place_order(1).await.unwrap();
    assert_eq!(placed.status, OrderStatus::Placed);
    assert!(placed.placed_at.is_some());
    assert_eq!(repo.order_items(placed.id).await.unwrap().len(), 1);
    assert!(repo.cart_lines(1).await.unwrap().is_empty());

    let next = repo.add_order_item(1, product.id).await.unwrap();
    assert_ne!(next.order_id, placed.id);
  }

  #[tokio::test]
  async fn placing_with_empty_cart_records_an_empty_order() {
    let repo = MemoryRepository::new();
    let order = repo.place_order(7).await.unwrap();
    assert_eq!(order.status, OrderStatus::Placed);
    assert!(repo.order_items(order.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn reset_restarts_ids() {
    let (repo, _) = repo_with_product().await;
    repo.reset().await.unwrap();
    assert!(repo.list_products().await.unwrap().is_empty());
    let product = repo
      .insert_product(NewProduct {
        name: "Printer".to_string(),
        price_cents: 8999,
      })
      .await
      .unwrap();
    assert_eq!(product.id, 1);
  }
}
