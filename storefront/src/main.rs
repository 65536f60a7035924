// storefront/src/main.rs

mod config;
mod db;
mod errors;
mod pipelines;
mod services;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat};
use crate::db::PgStore;
use crate::services::{JwtVerifier, LocalDirStorage, MercadoPagoGateway, SandboxGateway};
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use brasa::{BrasaService, MemoryStore, PaymentGateway, Store};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

async fn build_store(app_config: &AppConfig) -> std::io::Result<Arc<dyn Store>> {
  let Some(database_url) = app_config.database_url.as_deref() else {
    tracing::warn!("DATABASE_URL not set; orders are kept in memory and lost on restart.");
    return Ok(Arc::new(MemoryStore::new()));
  };

  let pool = PgPoolOptions::new()
    .max_connections(10)
    .acquire_timeout(Duration::from_secs(5))
    .connect(database_url)
    .await
    .map_err(|e| {
      tracing::error!(error = %e, "Failed to connect to the database.");
      std::io::Error::other(e)
    })?;
  tracing::info!("Successfully connected to the database.");

  let store = PgStore::new(pool);
  store.migrate().await.map_err(|e| {
    tracing::error!(error = %e, "Database migration failed.");
    std::io::Error::other(e)
  })?;
  tracing::info!("Database schema is up to date.");
  Ok(Arc::new(store))
}

fn build_gateway(app_config: &AppConfig) -> std::io::Result<Arc<dyn PaymentGateway>> {
  match app_config.mercadopago_access_token.as_deref() {
    Some(token) => {
      let gateway = MercadoPagoGateway::new(&app_config.mercadopago_api_base, token, app_config.gateway_timeout)
        .map_err(std::io::Error::other)?;
      tracing::info!(api_base = %app_config.mercadopago_api_base, "Using Mercado Pago gateway.");
      Ok(Arc::new(gateway))
    }
    None => {
      tracing::warn!("MERCADOPAGO_ACCESS_TOKEN not set; PIX charges go to the local sandbox.");
      Ok(Arc::new(SandboxGateway::new(Duration::from_millis(50))))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      // Tracing is not up yet; the log format is itself configuration.
      eprintln!("Failed to load application configuration: {}", e);
      return Err(std::io::Error::other(e));
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!("Starting Brasa storefront server...");

  let brasa_config = app_config.brasa_config().map_err(std::io::Error::other)?;
  let store = build_store(&app_config).await?;
  let gateway = build_gateway(&app_config)?;
  let avatars = Arc::new(LocalDirStorage::new(&app_config.avatar_dir, &app_config.avatar_public_base_url));

  let brasa = BrasaService::new(store, gateway, avatars.clone(), brasa_config);
  pipelines::register_all_pipelines(&brasa);

  let app_state = AppState::new(
    brasa,
    app_config.clone(),
    Arc::new(JwtVerifier::new(&app_config.jwt_secret)),
    avatars,
  );

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
