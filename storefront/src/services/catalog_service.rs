// storefront/src/services/catalog_service.rs

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::models::Product;

/// Read-only access to the product catalog.
#[derive(Clone)]
pub struct CatalogService {
  repo: Arc<dyn Repository>,
}

impl CatalogService {
  pub fn new(repo: Arc<dyn Repository>) -> Self {
    Self { repo }
  }

  #[instrument(name = "catalog_service::list_products", skip(self))]
  pub async fn list_products(&self) -> Result<Vec<Product>> {
    let products = self.repo.list_products().await?;
    info!("Fetched {} products.", products.len());
    Ok(products)
  }

  #[instrument(name = "catalog_service::get_product", skip(self))]
  pub async fn get_product(&self, product_id: i64) -> Result<Product> {
    match self.repo.find_product(product_id).await? {
      Some(product) => Ok(product),
      None => {
        warn!("Product with ID {} not found.", product_id);
        Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
      }
    }
  }
}
