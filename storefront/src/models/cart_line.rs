// storefront/src/models/cart_line.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An order item of the user's pending order, joined with its product.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub item_id: i64,
  pub product_id: i64,
  pub name: String,
  pub price_cents: i64,
  pub added_at: DateTime<Utc>,
}
