// storefront/src/pipelines/signin_pipeline.rs

use std::sync::Arc;

use orka::{ContextData, Orka, Pipeline, PipelineControl};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service::{self, INVALID_CREDENTIALS_MESSAGE};

/// Registers the sign-in pipeline. Unknown emails and wrong passwords fail
/// with the same `Auth` error.
pub fn register_signin_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email", false, None),
    ("verify_user_password", false, None),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let email = auth_service::normalize_email(&guard.email);
      if email.is_empty() || guard.password.is_empty() {
        return Err(AppError::Validation("Email and password are required.".to_string()));
      }
      guard.email = email;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signin_p.on_root("fetch_user_by_email", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (repo, email) = {
        let guard = ctx_data.read();
        (guard.repo.clone(), guard.email.clone())
      };

      let Some(user) = repo.find_user_by_email(&email).await? else {
        debug!("Login attempt for unknown email.");
        return Err(AppError::Auth(INVALID_CREDENTIALS_MESSAGE.to_string()));
      };
      ctx_data.write().user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signin_p.on_root("verify_user_password", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (user_id, stored_hash, password) = {
        let guard = ctx_data.read();
        let user = guard
          .user
          .as_ref()
          .ok_or_else(|| AppError::Internal("User missing in signin context.".to_string()))?;
        (user.id, user.password_hash.clone(), guard.password.clone())
      };

      if auth_service::verify_password_blocking(stored_hash, password).await? {
        info!(user_id, "User authenticated.");
        ctx_data.write().authenticated = true;
        Ok(PipelineControl::Continue)
      } else {
        warn!(user_id, "Password mismatch on login.");
        Err(AppError::Auth(INVALID_CREDENTIALS_MESSAGE.to_string()))
      }
    })
  });

  orka_instance.register_pipeline(signin_p);
  tracing::info!("Sign-in pipeline registered.");
}
