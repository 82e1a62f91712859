// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Upper bounds for the session lifetimes; larger values overflow the
/// timestamp and cookie arithmetic.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;
pub const MAX_REMEMBER_ME_DAYS: i64 = 3_650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
      "memory" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORAGE_BACKEND '{}': expected 'postgres' or 'memory'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub storage_backend: StorageBackend,
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,

  pub session_cookie_name: String,
  pub session_ttl_minutes: i64,
  pub remember_me_days: i64,
  pub session_cookie_secure: bool,

  pub log_format: LogFormat,
}

impl Default for AppConfig {
  /// In-memory defaults, used by tests and local development.
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      storage_backend: StorageBackend::Memory,
      database_url: None,
      database_max_connections: 5,
      run_migrations: true,
      seed_db: false,
      session_cookie_name: "storefront_session".to_string(),
      session_ttl_minutes: 120,
      remember_me_days: 30,
      session_cookie_secure: false,
      log_format: LogFormat::Pretty,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source. Unset variables
  /// fall back to their defaults; set but unparsable ones are errors.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();

    let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_var(&lookup, "SERVER_PORT", defaults.server_port)?;

    let storage_backend = match lookup("STORAGE_BACKEND") {
      Some(raw) => raw.parse::<StorageBackend>()?,
      None => StorageBackend::Postgres,
    };
    let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
    if storage_backend == StorageBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required when STORAGE_BACKEND=postgres)".to_string(),
      ));
    }
    let database_max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?;
    let run_migrations = parse_var(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?;
    let seed_db = parse_var(&lookup, "SEED_DB", defaults.seed_db)?;

    let session_cookie_name = lookup("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie_name);
    let session_ttl_minutes = parse_var(&lookup, "SESSION_TTL_MINUTES", defaults.session_ttl_minutes)?;
    let remember_me_days = parse_var(&lookup, "REMEMBER_ME_DAYS", defaults.remember_me_days)?;
    let session_cookie_secure = parse_var(&lookup, "SESSION_COOKIE_SECURE", defaults.session_cookie_secure)?;
    check_range("SESSION_TTL_MINUTES", session_ttl_minutes, MAX_SESSION_TTL_MINUTES)?;
    check_range("REMEMBER_ME_DAYS", remember_me_days, MAX_REMEMBER_ME_DAYS)?;

    let log_format = match lookup("LOG_FORMAT").as_deref() {
      None | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'",
          other
        )))
      }
    };

    Ok(Self {
      server_host,
      server_port,
      storage_backend,
      database_url,
      database_max_connections,
      run_migrations,
      seed_db,
      session_cookie_name,
      session_ttl_minutes,
      remember_me_days,
      session_cookie_secure,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn check_range(name: &str, value: i64, max: i64) -> Result<()> {
  if (1..=max).contains(&value) {
    Ok(())
  } else {
    Err(AppError::Config(format!(
      "Invalid {} value '{}': expected 1 to {}",
      name, value, max
    )))
  }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
  F: Fn(&str) -> Option<String>,
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
    None => Ok(default),
  }
}
