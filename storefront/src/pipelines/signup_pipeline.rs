// storefront/src/pipelines/signup_pipeline.rs

use std::sync::Arc;

use orka::{ContextData, Orka, Pipeline, PipelineControl};
use tracing::{event, info, warn, Level};

use crate::db::{DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USERNAME_MESSAGE};
use crate::errors::AppError;
use crate::models::NewUser;
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service;

/// Registers the sign-up pipeline with the Orka registry.
pub fn register_signup_pipeline(orka_instance: &Arc<Orka<AppError>>) {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_registration", false, None),
    ("check_existing_user", false, None),
    ("hash_user_password", false, None),
    ("create_user_in_db", false, None),
  ]);

  signup_p.on_root("validate_registration", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let registration = ctx_data.read().registration.clone();
      let (username, email) = auth_service::validate_registration(&registration)?;
      event!(Level::DEBUG, %username, "Registration input is valid.");
      {
        let mut guard = ctx_data.write();
        guard.username = username;
        guard.email = email;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signup_p.on_root("check_existing_user", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (repo, username, email) = {
        let guard = ctx_data.read();
        (guard.repo.clone(), guard.username.clone(), guard.email.clone())
      };

      if repo.find_user_by_username(&username).await?.is_some() {
        warn!("Registration rejected: username already taken.");
        return Err(AppError::Validation(DUPLICATE_USERNAME_MESSAGE.to_string()));
      }
      if repo.find_user_by_email(&email).await?.is_some() {
        warn!("Registration rejected: email already registered.");
        return Err(AppError::Validation(DUPLICATE_EMAIL_MESSAGE.to_string()));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signup_p.on_root("hash_user_password", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let password = ctx_data.read().registration.password.clone();
      let password_hash = auth_service::hash_password_blocking(password).await?;
      ctx_data.write().password_hash = Some(password_hash);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signup_p.on_root("create_user_in_db", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (repo, new_user) = {
        let guard = ctx_data.read();
        let password_hash = guard
          .password_hash
          .clone()
          .ok_or_else(|| AppError::Internal("Password hash missing in signup context.".to_string()))?;
        (
          guard.repo.clone(),
          NewUser {
            username: guard.username.clone(),
            email: guard.email.clone(),
            password_hash,
          },
        )
      };

      // A concurrent registration can still win the race; the repository
      // reports that as the same validation error.
      let user = repo.insert_user(new_user).await?;
      info!(user_id = user.id, "User registered.");
      ctx_data.write().created_user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  orka_instance.register_pipeline(signup_p);
  tracing::info!("Sign-up pipeline registered.");
}
