// storefront/src/web/handlers/scanner_handlers.rs

//! The attendant's pickup scanner. Each administrator gets a station of their
//! own; its state returns to `ready` by itself after an outcome is shown.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use super::extractors::AdminUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct ScanPayload {
  /// Raw QR payload, usually the ticket URL.
  pub code: String,
}

#[instrument(name = "handler::scanner_state", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn scanner_state_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let station = app_state.scanner_for(admin.0.user_id);
  Ok(HttpResponse::Ok().json(station.state()))
}

/// Rejections (unpaid, already delivered, unknown code) come back as a 200
/// with a `rejected` state; only a busy station is an HTTP error.
#[instrument(name = "handler::scan", skip(app_state, admin, req_payload), fields(admin_id = %admin.0.user_id))]
pub async fn scan_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req_payload: web::Json<ScanPayload>,
) -> Result<HttpResponse, AppError> {
  let station = app_state.scanner_for(admin.0.user_id);
  let state = station.scan(&req_payload.code).await?;
  Ok(HttpResponse::Ok().json(state))
}

#[instrument(name = "handler::scanner_reset", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn scanner_reset_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let station = app_state.scanner_for(admin.0.user_id);
  Ok(HttpResponse::Ok().json(station.reset_now()))
}

/// Closes the station; a pending auto-reset is cancelled with it.
#[instrument(name = "handler::scanner_close", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn scanner_close_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  if app_state.release_scanner(admin.0.user_id) {
    info!("Scanner station closed for {}.", admin.0.user_id);
  }
  Ok(HttpResponse::NoContent().finish())
}
