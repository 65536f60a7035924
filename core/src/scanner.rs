// core/src/scanner.rs

//! The attendant's scanning station: READY -> PROCESSING -> DELIVERED / REJECTED,
//! falling back to READY on its own after a short delay or on a manual restart.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{BrasaError, BrasaResult};
use crate::pickup::{PickupGuard, PickupReceipt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScannerState {
  Ready,
  Processing,
  Delivered { receipt: PickupReceipt },
  Rejected { message: String },
}

struct StationInner {
  state: ScannerState,
  /// Bumped on every scan and reset; a timer only fires for its own generation.
  generation: u64,
  pending_reset: Option<JoinHandle<()>>,
}

impl StationInner {
  fn cancel_pending_reset(&mut self) {
    if let Some(handle) = self.pending_reset.take() {
      handle.abort();
    }
  }
}

/// Must be used from within a Tokio runtime: outcomes schedule a reset task.
pub struct ScannerStation {
  inner: Arc<Mutex<StationInner>>,
  guard: PickupGuard,
  reset_after: Duration,
}

impl ScannerStation {
  pub fn new(guard: PickupGuard, reset_after: Duration) -> Self {
    Self {
      inner: Arc::new(Mutex::new(StationInner {
        state: ScannerState::Ready,
        generation: 0,
        pending_reset: None,
      })),
      guard,
      reset_after,
    }
  }

  pub fn state(&self) -> ScannerState {
    self.inner.lock().state.clone()
  }

  /// Redeems `code` and shows the outcome until the reset timer fires.
  /// Scanning while an outcome is on screen replaces it.
  pub async fn scan(&self, code: &str) -> BrasaResult<ScannerState> {
    let generation = {
      let mut inner = self.inner.lock();
      if inner.state == ScannerState::Processing {
        return Err(BrasaError::ScannerBusy);
      }
      inner.cancel_pending_reset();
      inner.generation += 1;
      inner.state = ScannerState::Processing;
      inner.generation
    };

    let mut in_flight = InFlightScan {
      inner: &self.inner,
      generation,
      finished: false,
    };
    let outcome = match self.guard.redeem(code).await {
      Ok(receipt) => ScannerState::Delivered { receipt },
      Err(err) => ScannerState::Rejected {
        message: err.to_string(),
      },
    };
    in_flight.finished = true;

    let mut inner = self.inner.lock();
    if inner.generation != generation {
      // Restarted while the lookup was in flight.
      return Ok(inner.state.clone());
    }
    inner.state = outcome.clone();
    inner.pending_reset = Some(schedule_reset(Arc::downgrade(&self.inner), generation, self.reset_after));
    Ok(outcome)
  }

  /// Manual restart: cancels the pending timer and returns to READY.
  pub fn reset_now(&self) -> ScannerState {
    let mut inner = self.inner.lock();
    inner.cancel_pending_reset();
    inner.generation += 1;
    inner.state = ScannerState::Ready;
    info!("Scanner station restarted.");
    ScannerState::Ready
  }
}

impl Drop for ScannerStation {
  fn drop(&mut self) {
    self.inner.lock().cancel_pending_reset();
  }
}

/// Puts the station back to READY when a scan is dropped before its lookup ends.
struct InFlightScan<'a> {
  inner: &'a Mutex<StationInner>,
  generation: u64,
  finished: bool,
}

impl Drop for InFlightScan<'_> {
  fn drop(&mut self) {
    if self.finished {
      return;
    }
    let mut inner = self.inner.lock();
    if inner.generation == self.generation && inner.state == ScannerState::Processing {
      inner.state = ScannerState::Ready;
      debug!("Scan abandoned mid-lookup; station back to ready.");
    }
  }
}

fn schedule_reset(inner: Weak<Mutex<StationInner>>, generation: u64, after: Duration) -> JoinHandle<()> {
  tokio::spawn(async move {
    tokio::time::sleep(after).await;
    let Some(inner) = inner.upgrade() else {
      return;
    };
    let mut inner = inner.lock();
    if inner.generation == generation {
      inner.state = ScannerState::Ready;
      inner.pending_reset = None;
      debug!("Scanner station auto-reset.");
    }
  })
}
