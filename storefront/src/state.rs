// storefront/src/state.rs
use crate::config::AppConfig;
use crate::services::{JwtVerifier, LocalDirStorage};
use brasa::{BrasaService, ScannerStation};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
  pub brasa: BrasaService,
  pub config: Arc<AppConfig>,
  pub jwt: Arc<JwtVerifier>,
  pub avatars: Arc<LocalDirStorage>,
  /// One scanning station per signed-in attendant.
  scanners: Arc<Mutex<HashMap<Uuid, Arc<ScannerStation>>>>,
}

impl AppState {
  pub fn new(brasa: BrasaService, config: Arc<AppConfig>, jwt: Arc<JwtVerifier>, avatars: Arc<LocalDirStorage>) -> Self {
    Self {
      brasa,
      config,
      jwt,
      avatars,
      scanners: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  pub fn scanner_for(&self, operator_id: Uuid) -> Arc<ScannerStation> {
    self
      .scanners
      .lock()
      .entry(operator_id)
      .or_insert_with(|| {
        Arc::new(ScannerStation::new(
          self.brasa.pickup_guard(),
          self.brasa.config().scanner_reset_after,
        ))
      })
      .clone()
  }

  /// Drops the operator's station, cancelling any pending auto-reset.
  pub fn release_scanner(&self, operator_id: Uuid) -> bool {
    self.scanners.lock().remove(&operator_id).is_some()
  }
}
