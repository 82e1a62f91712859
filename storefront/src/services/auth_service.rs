// storefront/src/services/auth_service.rs

//! Registration, credential checks and the password hashing helpers behind them.

use std::sync::Arc;

use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use orka::{ContextData, Orka};
use rand_core::OsRng; // For generating random salts
use tracing::{debug, error, instrument};

use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::models::User;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::pipelines::run_to_completion;

/// Shown for every failed login, whether or not the email is known.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Login unsuccessful. Please check your email and password.";

pub const USERNAME_MIN_LEN: usize = 2;
pub const USERNAME_MAX_LEN: usize = 20;
pub const EMAIL_MAX_LEN: usize = 120;

/// Hashes a plain-text password with Argon2 and a fresh random salt.
///
/// Returns the PHC string form of the hash, or `Validation` for an empty
/// password.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    error!("Password hashing failed: Password cannot be empty.");
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// `Ok(false)` means the password does not match. A stored hash that cannot
/// be parsed is an `Internal` error.
#[instrument(
  name = "auth_service::verify_password",
  skip(hashed_password_str, provided_password),
  err(Display),
  fields(hash_len = hashed_password_str.len())
)]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

// Argon2 is deliberately slow; keep it off the async workers.
pub(crate) async fn hash_password_blocking(password: String) -> Result<String> {
  tokio::task::spawn_blocking(move || hash_password(&password))
    .await
    .map_err(|join_err| AppError::Internal(format!("Password hashing task failed: {}", join_err)))?
}

pub(crate) async fn verify_password_blocking(hash: String, password: String) -> Result<bool> {
  tokio::task::spawn_blocking(move || verify_password(&hash, &password))
    .await
    .map_err(|join_err| AppError::Internal(format!("Password verification task failed: {}", join_err)))?
}

/// Raw registration form values.
#[derive(Debug, Clone, Default)]
pub struct Registration {
  pub username: String,
  pub email: String,
  pub password: String,
  pub confirm_password: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
  email.trim().to_ascii_lowercase()
}

fn is_valid_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
    }
    None => false,
  }
}

/// Checks the form fields and returns the normalized `(username, email)`.
pub fn validate_registration(form: &Registration) -> Result<(String, String)> {
  let username = form.username.trim();
  let email = normalize_email(&form.email);

  if username.is_empty() || email.is_empty() || form.password.is_empty() {
    return Err(AppError::Validation("Username, email and password are required.".to_string()));
  }
  let username_len = username.chars().count();
  if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
    return Err(AppError::Validation(format!(
      "Username must be between {} and {} characters long.",
      USERNAME_MIN_LEN, USERNAME_MAX_LEN
    )));
  }
  if email.len() > EMAIL_MAX_LEN || !is_valid_email(&email) {
    return Err(AppError::Validation("Valid email is required.".to_string()));
  }
  if let Some(confirm) = &form.confirm_password {
    if confirm != &form.password {
      return Err(AppError::Validation("Passwords must match.".to_string()));
    }
  }
  Ok((username.to_string(), email))
}

#[derive(Clone)]
pub struct AuthService {
  repo: Arc<dyn Repository>,
  orka: Arc<Orka<AppError>>,
}

impl AuthService {
  pub fn new(repo: Arc<dyn Repository>, orka: Arc<Orka<AppError>>) -> Self {
    Self { repo, orka }
  }

  /// Creates an account through the sign-up pipeline. Missing, malformed or
  /// already-taken fields are `Validation` errors; the password is only ever
  /// stored hashed.
  #[instrument(name = "auth_service::register", skip(self, form), fields(username = %form.username), err(Display))]
  pub async fn register(&self, form: Registration) -> Result<User> {
    let ctx_data = ContextData::new(SignupCtxData::new(self.repo.clone(), form));
    run_to_completion(&self.orka, &ctx_data, "signup").await?;

    let created_user = ctx_data.read().created_user.clone();
    created_user.ok_or_else(|| AppError::Internal("Sign-up completed without creating a user.".to_string()))
  }

  /// Checks an email/password pair through the sign-in pipeline.
  #[instrument(name = "auth_service::authenticate", skip(self, email, password), err(Display))]
  pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
    let ctx_data = ContextData::new(SigninCtxData::new(self.repo.clone(), email, password));
    run_to_completion(&self.orka, &ctx_data, "signin").await?;

    let authenticated_user = {
      let guard = ctx_data.read();
      if guard.authenticated {
        guard.user.clone()
      } else {
        None
      }
    };
    authenticated_user.ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS_MESSAGE.to_string()))
  }

  pub async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
    self.repo.find_user_by_id(user_id).await
  }
}
