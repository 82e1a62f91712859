// storefront/src/state.rs

use std::sync::Arc;

use orka::Orka;
use tracing::{info, warn};

use crate::config::{AppConfig, StorageBackend};
use crate::db::{MemoryRepository, PgRepository, Repository};
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::services::{AuthService, CartService, CatalogService, SessionStore};

#[derive(Clone)]
pub struct AppState {
  pub repo: Arc<dyn Repository>,
  pub orka: Arc<Orka<AppError>>,
  pub auth: AuthService,
  pub catalog: CatalogService,
  pub cart: CartService,
  pub sessions: SessionStore,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the services onto `repo`, with a freshly built pipeline registry.
  pub fn new(repo: Arc<dyn Repository>, config: Arc<AppConfig>) -> Self {
    let orka_instance = pipelines::build_registry();
    Self {
      auth: AuthService::new(repo.clone(), orka_instance.clone()),
      catalog: CatalogService::new(repo.clone()),
      cart: CartService::new(repo.clone(), orka_instance.clone()),
      sessions: SessionStore::from_config(&config),
      orka: orka_instance,
      repo,
      config,
    }
  }

  /// Opens the configured storage backend and wires the services onto it.
  pub async fn from_config(config: Arc<AppConfig>) -> Result<Self> {
    let repo: Arc<dyn Repository> = match config.storage_backend {
      StorageBackend::Postgres => {
        let database_url = config
          .database_url
          .as_deref()
          .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
        let pg = PgRepository::connect(database_url, config.database_max_connections, config.run_migrations).await?;
        Arc::new(pg)
      }
      StorageBackend::Memory => {
        warn!("Using the in-memory storage backend; data is lost on restart.");
        Arc::new(MemoryRepository::new())
      }
    };
    info!(backend = ?config.storage_backend, "Storage backend ready.");
    Ok(Self::new(repo, config))
  }
}
