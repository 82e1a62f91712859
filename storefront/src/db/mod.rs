// storefront/src/db/mod.rs

//! Persistence seam. Services talk to a `Repository`; the server picks the
//! Postgres implementation, tests and `STORAGE_BACKEND=memory` use the
//! in-process one.

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::errors::Result;
use crate::models::{CartLine, NewProduct, NewUser, Order, OrderItem, Product, User};
use async_trait::async_trait;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "That email is already registered. Please choose a different one.";
pub const DUPLICATE_USERNAME_MESSAGE: &str = "That username is taken. Please choose a different one.";

#[async_trait]
pub trait Repository: Send + Sync + 'static {
  /// Inserts a user. A username or email collision is a `Validation` error.
  async fn insert_user(&self, new_user: NewUser) -> Result<User>;
  async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

  async fn insert_product(&self, new_product: NewProduct) -> Result<Product>;
  /// All products, ordered by id.
  async fn list_products(&self) -> Result<Vec<Product>>;
  async fn find_product(&self, product_id: i64) -> Result<Option<Product>>;

  /// Appends an item to the user's pending order, creating that order first
  /// if the user has none.
  async fn add_order_item(&self, user_id: i64, product_id: i64) -> Result<OrderItem>;
  /// Lines of the user's pending order in insertion order.
  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>>;
  /// Moves the pending order to `placed`, or records an empty placed order
  /// when there is nothing pending.
  async fn place_order(&self, user_id: i64) -> Result<Order>;
  /// Every order of the user, newest first.
  async fn list_orders(&self, user_id: i64) -> Result<Vec<Order>>;
  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>>;

  /// Drops all rows. Used by seeding.
  async fn reset(&self) -> Result<()>;
}
