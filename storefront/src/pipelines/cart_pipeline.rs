// storefront/src/pipelines/cart_pipeline.rs

use std::sync::Arc;

use orka::{ContextData, Orka, Pipeline, PipelineControl};
use tracing::{event, info, warn, Level};

use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;

/// Registers the add-to-cart pipeline. Each run appends one line to the
/// user's pending order.
pub fn register_add_to_cart_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut add_p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("fetch_product_for_cart", false, None),
    ("add_order_item_db", false, None),
  ]);

  add_p.on_root("fetch_product_for_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (repo, product_id) = {
        let guard = ctx_data.read();
        (guard.repo.clone(), guard.product_id)
      };

      match repo.find_product(product_id).await? {
        Some(product) => {
          event!(Level::DEBUG, product_id, name = %product.name, "Product found for cart.");
          ctx_data.write().product = Some(product);
          Ok(PipelineControl::Continue)
        }
        None => {
          warn!("Add to cart rejected: product {} not found.", product_id);
          Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
        }
      }
    })
  });

  add_p.on_root("add_order_item_db", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (repo, user_id, product_id) = {
        let guard = ctx_data.read();
        (guard.repo.clone(), guard.user_id, guard.product_id)
      };

      let item = repo.add_order_item(user_id, product_id).await?;
      info!(item_id = item.id, order_id = item.order_id, "Product added to cart.");
      ctx_data.write().added_item = Some(item);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(add_p);
  tracing::info!("Add-to-cart pipeline registered.");
}
