// tests/postgres_repository_tests.rs
//! Runs against a real database named by `STOREFRONT_TEST_DATABASE_URL`.
//! Every test truncates all tables, so point it at a scratch database.
//! Without the variable the tests log a notice and pass.
mod common;

use std::sync::Arc;

use futures_util::future::join_all;
use serial_test::serial;
use tracing::warn;

use storefront::db::{PgRepository, Repository};
use storefront::models::{NewProduct, NewUser, OrderStatus};

const TEST_DATABASE_URL_VAR: &str = "STOREFRONT_TEST_DATABASE_URL";

async fn fresh_repository() -> Option<Arc<PgRepository>> {
  common::setup_tracing();
  let Ok(database_url) = std::env::var(TEST_DATABASE_URL_VAR) else {
    warn!("{} is not set; skipping Postgres repository test.", TEST_DATABASE_URL_VAR);
    return None;
  };
  let repo = PgRepository::connect(&database_url, 10, true)
    .await
    .expect("connecting to the test database");
  repo.reset().await.expect("truncating the test database");
  Some(Arc::new(repo))
}

/// Inserts one user and one product, returning their ids.
async fn user_and_product(repo: &PgRepository) -> (i64, i64) {
  let user = repo
    .insert_user(NewUser {
      username: "shopper".to_string(),
      email: "shopper@example.com".to_string(),
      password_hash: "not-a-real-hash".to_string(),
    })
    .await
    .unwrap();
  let product = repo
    .insert_product(NewProduct {
      name: "Keyboard".to_string(),
      price_cents: 4_999,
    })
    .await
    .unwrap();
  (user.id, product.id)
}

#[tokio::test]
#[serial]
async fn test_add_checkout_then_new_cart() {
  let Some(repo) = fresh_repository().await else { return };
  let (user_id, product_id) = user_and_product(&repo).await;

  let first = repo.add_order_item(user_id, product_id).await.unwrap();
  let second = repo.add_order_item(user_id, product_id).await.unwrap();
  assert_eq!(first.order_id, second.order_id, "both lines land in the same pending order");
  assert_ne!(first.id, second.id);
  assert_eq!(repo.cart_lines(user_id).await.unwrap().len(), 2);

  let placed = repo.place_order(user_id).await.unwrap();
  assert_eq!(placed.id, first.order_id);
  assert_eq!(placed.status, OrderStatus::Placed);
  assert!(placed.placed_at.is_some());
  assert_eq!(repo.order_items(placed.id).await.unwrap().len(), 2);
  assert!(repo.cart_lines(user_id).await.unwrap().is_empty());

  let next = repo.add_order_item(user_id, product_id).await.unwrap();
  assert_ne!(next.order_id, placed.id, "a new pending order is opened after checkout");
  assert_eq!(repo.cart_lines(user_id).await.unwrap().len(), 1);

  let orders = repo.list_orders(user_id).await.unwrap();
  assert_eq!(orders.len(), 2);
  assert_eq!(orders[0].id, next.order_id);
  assert_eq!(orders[0].status, OrderStatus::Pending);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_concurrent_adds_and_checkouts_lose_no_items() {
  let Some(repo) = fresh_repository().await else { return };
  let (user_id, product_id) = user_and_product(&repo).await;
  const ADDS: usize = 40;

  let adds = (0..ADDS).map(|_| {
    let repo = repo.clone();
    tokio::spawn(async move { repo.add_order_item(user_id, product_id).await })
  });
  let checkouts = (0..8).map(|_| {
    let repo = repo.clone();
    tokio::spawn(async move { repo.place_order(user_id).await })
  });
  let (add_results, checkout_results) = tokio::join!(join_all(adds), join_all(checkouts));

  for result in add_results {
    result.expect("add task panicked").expect("every add succeeds while checkouts run");
  }
  for result in checkout_results {
    result.expect("checkout task panicked").expect("every checkout succeeds");
  }

  repo.place_order(user_id).await.unwrap();
  assert!(repo.cart_lines(user_id).await.unwrap().is_empty());

  let orders = repo.list_orders(user_id).await.unwrap();
  let mut stored_items = 0;
  for order in &orders {
    assert_eq!(order.status, OrderStatus::Placed);
    stored_items += repo.order_items(order.id).await.unwrap().len();
  }
  assert_eq!(stored_items, ADDS);
}
