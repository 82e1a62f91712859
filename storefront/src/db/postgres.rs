// storefront/src/db/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use super::{Repository, DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USERNAME_MESSAGE};
use crate::errors::{AppError, Result};
use crate::models::{CartLine, NewProduct, NewUser, Order, OrderItem, Product, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";
const PRODUCT_COLUMNS: &str = "id, name, price_cents, created_at";
const ORDER_COLUMNS: &str = "id, user_id, status, created_at, placed_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, added_at";

#[derive(Debug, Clone)]
pub struct PgRepository {
  pool: PgPool,
}

impl PgRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Opens a pool and, if asked to, brings the schema up to date.
  pub async fn connect(database_url: &str, max_connections: u32, run_migrations: bool) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await
      .map_err(|e| {
        error!(error = %e, "Failed to connect to the database.");
        AppError::Sqlx(e)
      })?;
    info!("Successfully connected to the database.");

    if run_migrations {
      sqlx::migrate!("./migrations").run(&pool).await?;
      info!("Database migrations applied.");
    }

    Ok(Self::new(pool))
  }
}

/// Turns a unique-constraint violation on `users` into the matching
/// validation message; anything else stays a database error.
fn map_user_insert_error(err: sqlx::Error) -> AppError {
  let duplicate_email = err
    .as_database_error()
    .filter(|db_err| db_err.is_unique_violation())
    .map(|db_err| db_err.constraint().is_some_and(|c| c.contains("email")));

  match duplicate_email {
    Some(true) => AppError::Validation(DUPLICATE_EMAIL_MESSAGE.to_string()),
    Some(false) => AppError::Validation(DUPLICATE_USERNAME_MESSAGE.to_string()),
    None => AppError::Sqlx(err),
  }
}

#[async_trait]
impl Repository for PgRepository {
  #[instrument(name = "pg::insert_user", skip(self, new_user), fields(username = %new_user.username), err(Display))]
  async fn insert_user(&self, new_user: NewUser) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .fetch_one(&self.pool)
    .await
    .map_err(map_user_insert_error)
  }

  async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
      .bind(username)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn insert_product(&self, new_product: NewProduct) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(&format!(
      "INSERT INTO products (name, price_cents) VALUES ($1, $2) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(&new_product.name)
    .bind(new_product.price_cents)
    .fetch_one(&self.pool)
    .await?;
    Ok(product)
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products ORDER BY id ASC", PRODUCT_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  async fn find_product(&self, product_id: i64) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  #[instrument(name = "pg::add_order_item", skip(self), err(Display))]
  async fn add_order_item(&self, user_id: i64, product_id: i64) -> Result<OrderItem> {
    let mut tx = self.pool.begin().await?;

    // The partial unique index keeps this at one pending order per user. The
    // no-op update locks that row until commit, so a concurrent checkout
    // either waits for this item or has already moved the order out of
    // `pending`, in which case a new pending order is created here.
    let order_id: i64 = sqlx::query_scalar(
      "INSERT INTO orders (user_id, status) VALUES ($1, 'pending') \
       ON CONFLICT (user_id) WHERE status = 'pending' \
       DO UPDATE SET user_id = EXCLUDED.user_id \
       RETURNING id",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let item = sqlx::query_as::<_, OrderItem>(&format!(
      "INSERT INTO order_items (order_id, product_id) VALUES ($1, $2) RETURNING {}",
      ORDER_ITEM_COLUMNS
    ))
    .bind(order_id)
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    debug!(order_id, item_id = item.id, "Order item stored.");
    Ok(item)
  }

  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
      "SELECT oi.id AS item_id, p.id AS product_id, p.name, p.price_cents, oi.added_at \
       FROM order_items oi \
       JOIN orders o ON o.id = oi.order_id \
       JOIN products p ON p.id = oi.product_id \
       WHERE o.user_id = $1 AND o.status = 'pending' \
       ORDER BY oi.id ASC",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(lines)
  }

  #[instrument(name = "pg::place_order", skip(self), err(Display))]
  async fn place_order(&self, user_id: i64) -> Result<Order> {
    let mut tx = self.pool.begin().await?;

    let placed = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET status = 'placed', placed_at = NOW() \
       WHERE user_id = $1 AND status = 'pending' RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let order = match placed {
      Some(order) => order,
      None => {
        sqlx::query_as::<_, Order>(&format!(
          "INSERT INTO orders (user_id, status, placed_at) VALUES ($1, 'placed', NOW()) RETURNING {}",
          ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?
      }
    };

    tx.commit().await?;
    Ok(order)
  }

  async fn list_orders(&self, user_id: i64) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY id DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }

  async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(&format!(
      "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id ASC",
      ORDER_ITEM_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  async fn reset(&self) -> Result<()> {
    sqlx::query("TRUNCATE order_items, orders, products, users RESTART IDENTITY CASCADE")
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}
