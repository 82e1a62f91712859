// storefront/src/pipelines/contexts.rs

//! Data carried through each workflow. Handlers receive these wrapped in
//! `orka::ContextData`.

use std::sync::Arc;

use crate::db::Repository;
use crate::models::{Order, OrderItem, Product, User};
use crate::services::auth_service::Registration;

#[derive(Clone)]
pub struct SignupCtxData {
  pub repo: Arc<dyn Repository>,
  pub registration: Registration,
  // Filled by `validate_registration`.
  pub username: String,
  pub email: String,
  pub password_hash: Option<String>,
  pub created_user: Option<User>,
}

impl SignupCtxData {
  pub fn new(repo: Arc<dyn Repository>, registration: Registration) -> Self {
    Self {
      repo,
      registration,
      username: String::new(),
      email: String::new(),
      password_hash: None,
      created_user: None,
    }
  }
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub repo: Arc<dyn Repository>,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub authenticated: bool,
}

impl SigninCtxData {
  pub fn new(repo: Arc<dyn Repository>, email: &str, password: &str) -> Self {
    Self {
      repo,
      email: email.to_string(),
      password: password.to_string(),
      user: None,
      authenticated: false,
    }
  }
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub repo: Arc<dyn Repository>,
  pub user_id: i64,
  pub product_id: i64,
  pub product: Option<Product>,
  pub added_item: Option<OrderItem>,
}

impl AddToCartCtxData {
  pub fn new(repo: Arc<dyn Repository>, user_id: i64, product_id: i64) -> Self {
    Self {
      repo,
      user_id,
      product_id,
      product: None,
      added_item: None,
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub repo: Arc<dyn Repository>,
  pub user_id: i64,
  pub placed_order: Option<Order>,
  pub item_count: usize,
}

impl CheckoutCtxData {
  pub fn new(repo: Arc<dyn Repository>, user_id: i64) -> Self {
    Self {
      repo,
      user_id,
      placed_order: None,
      item_count: 0,
    }
  }
}
