// storefront/src/db/seed.rs

use tracing::{info, instrument};

use super::Repository;
use crate::errors::Result;
use crate::models::NewProduct;
use crate::services::Registration;
use crate::state::AppState;

pub const SAMPLE_PRODUCTS: [(&str, i64); 8] = [
  ("Laptop", 99_999),
  ("Smartphone", 49_999),
  ("Headphones", 14_999),
  ("Smartwatch", 19_999),
  ("Keyboard", 4_999),
  ("Mouse", 2_999),
  ("Monitor", 24_999),
  ("Printer", 8_999),
];

pub const SAMPLE_USERNAME: &str = "testuser";
pub const SAMPLE_EMAIL: &str = "testuser@example.com";
pub const SAMPLE_PASSWORD: &str = "password";

/// Wipes every table, then loads the sample catalog and the sample user.
/// The sample user goes through the regular sign-up pipeline.
#[instrument(name = "seed::seed", skip(state), err(Display))]
pub async fn seed(state: &AppState) -> Result<()> {
  let repo = &state.repo;
  repo.reset().await?;

  for (name, price_cents) in SAMPLE_PRODUCTS {
    repo
      .insert_product(NewProduct {
        name: name.to_string(),
        price_cents,
      })
      .await?;
  }

  state
    .auth
    .register(Registration {
      username: SAMPLE_USERNAME.to_string(),
      email: SAMPLE_EMAIL.to_string(),
      password: SAMPLE_PASSWORD.to_string(),
      confirm_password: None,
    })
    .await?;

  info!("Sample data added successfully.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::config::AppConfig;
  use crate::db::MemoryRepository;

  #[tokio::test]
  async fn seeding_twice_yields_the_same_catalog() {
    let state = AppState::new(Arc::new(MemoryRepository::new()), Arc::new(AppConfig::default()));
    seed(&state).await.unwrap();
    seed(&state).await.unwrap();

    let products = state.repo.list_products().await.unwrap();
    assert_eq!(products.len(), SAMPLE_PRODUCTS.len());
    assert_eq!(products[0].id, 1);
    assert_eq!(products[0].name, "Laptop");
    assert_eq!(products[0].price_cents, 99_999);

    let user = state.auth.authenticate(SAMPLE_EMAIL, SAMPLE_PASSWORD).await.unwrap();
    assert_eq!(user.username, SAMPLE_USERNAME);
  }
}
