// storefront/src/pipelines/checkout_pipeline.rs

use std::sync::Arc;

use orka::{ContextData, Orka, Pipeline, PipelineControl};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::CheckoutCtxData;

/// Registers the checkout pipeline: place the pending order, then count the
/// lines that went with it.
pub fn register_checkout_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut checkout_p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("place_pending_order", false, None),
    ("count_placed_items", true, None),
  ]);

  checkout_p.on_root("place_pending_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (repo, user_id) = {
        let guard = ctx_data.read();
        (guard.repo.clone(), guard.user_id)
      };

      let order = repo.place_order(user_id).await?;
      info!(order_id = order.id, "Order placed.");
      ctx_data.write().placed_order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  checkout_p.on_root("count_placed_items", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (repo, order_id) = {
        let guard = ctx_data.read();
        (guard.repo.clone(), guard.placed_order.as_ref().map(|o| o.id))
      };
      let Some(order_id) = order_id else {
        return Ok(PipelineControl::Continue);
      };

      let item_count = repo.order_items(order_id).await?.len();
      if item_count == 0 {
        warn!(order_id, "Checked out an empty cart.");
      }
      ctx_data.write().item_count = item_count;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(checkout_p);
  tracing::info!("Checkout pipeline registered.");
}
