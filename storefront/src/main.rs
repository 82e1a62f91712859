// storefront/src/main.rs

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

use storefront::config::{AppConfig, LogFormat};
use storefront::db::seed;
use storefront::state::AppState;
use storefront::web::configure_app_routes;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

fn init_tracing(format: LogFormat) {
  let builder = tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration

  match format {
    LogFormat::Pretty => builder.init(),
    LogFormat::Json => builder.json().init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  init_tracing(app_config.log_format);

  tracing::info!("Starting storefront server...");

  let app_state = AppState::from_config(app_config.clone())
    .await
    .context("Failed to initialize storage")?;

  if app_config.seed_db {
    seed::seed(&app_state).await.context("Failed to seed database")?;
  }

  // Expired sessions are also dropped lazily on lookup; this keeps abandoned
  // ones from piling up.
  let sessions = app_state.sessions.clone();
  actix_web::rt::spawn(async move {
    let mut interval = actix_web::rt::time::interval(SESSION_PURGE_INTERVAL);
    loop {
      interval.tick().await;
      let purged = sessions.purge_expired();
      if purged > 0 {
        tracing::debug!(purged, "Purged expired sessions.");
      }
    }
  });

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
