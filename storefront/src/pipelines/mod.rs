// storefront/src/pipelines/mod.rs

//! Orka workflows behind registration, login, add-to-cart and checkout.

use std::sync::Arc;

use orka::{ContextData, Orka, PipelineResult};
use tracing::warn;

use crate::errors::{AppError, Result};

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every storefront pipeline with the given Orka registry.
///
/// Called once while building `AppState`.
pub fn register_all_pipelines(orka_instance: &Arc<Orka<AppError>>) {
  tracing::info!("Registering Orka pipelines...");

  signup_pipeline::register_signup_pipeline(orka_instance);
  signin_pipeline::register_signin_pipeline(orka_instance);
  cart_pipeline::register_add_to_cart_pipeline(orka_instance);
  checkout_pipeline::register_checkout_pipeline(orka_instance);

  tracing::info!("All storefront pipelines registered with Orka.");
}

/// A fresh registry with all pipelines registered.
pub fn build_registry() -> Arc<Orka<AppError>> {
  let orka_instance = Arc::new(Orka::<AppError>::new());
  register_all_pipelines(&orka_instance);
  orka_instance
}

/// Runs the pipeline registered for `TData`. A handler that stops the
/// pipeline early turns into `PipelineHalted`.
pub async fn run_to_completion<TData>(
  orka_instance: &Orka<AppError>,
  ctx_data: &ContextData<TData>,
  pipeline_name: &'static str,
) -> Result<()>
where
  TData: 'static + Send + Sync,
{
  match orka_instance.run(ctx_data.clone()).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => {
      warn!(pipeline = pipeline_name, "Pipeline stopped before completing.");
      Err(AppError::PipelineHalted(pipeline_name))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use orka::{Pipeline, PipelineControl};

  struct GateCtx {
    open: bool,
    passed: bool,
  }

  fn gate_registry() -> Arc<Orka<AppError>> {
    let orka_instance = Arc::new(Orka::<AppError>::new());
    let mut gate_p = Pipeline::<GateCtx, AppError>::new(&[("check_gate", false, None), ("pass_gate", false, None)]);
    gate_p.on_root("check_gate", |ctx_data: ContextData<GateCtx>| {
      Box::pin(async move {
        let open = ctx_data.read().open;
        Ok::<_, AppError>(if open { PipelineControl::Continue } else { PipelineControl::Stop })
      })
    });
    gate_p.on_root("pass_gate", |ctx_data: ContextData<GateCtx>| {
      Box::pin(async move {
        ctx_data.write().passed = true;
        Ok::<_, AppError>(PipelineControl::Continue)
      })
    });
    orka_instance.register_pipeline(gate_p);
    orka_instance
  }

  #[tokio::test]
  async fn completed_pipeline_runs_every_step() {
    let orka_instance = gate_registry();
    let ctx_data = ContextData::new(GateCtx { open: true, passed: false });
    run_to_completion(&orka_instance, &ctx_data, "gate").await.unwrap();
    assert!(ctx_data.read().passed);
  }

  #[tokio::test]
  async fn stopped_pipeline_is_a_halt_error() {
    let orka_instance = gate_registry();
    let ctx_data = ContextData::new(GateCtx { open: false, passed: false });
    let err = run_to_completion(&orka_instance, &ctx_data, "gate").await.unwrap_err();
    assert!(matches!(err, AppError::PipelineHalted("gate")));
    assert!(!ctx_data.read().passed);
  }

  #[tokio::test]
  async fn unregistered_context_is_a_workflow_error() {
    let orka_instance = build_registry();
    let ctx_data = ContextData::new(GateCtx { open: true, passed: false });
    let err = run_to_completion(&orka_instance, &ctx_data, "gate").await.unwrap_err();
    assert!(matches!(err, AppError::Workflow { .. }));
  }
}
