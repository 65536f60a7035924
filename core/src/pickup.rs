// core/src/pickup.rs

//! Hand-over at the drive-thru window. An order is handed over at most once,
//! however many times or from however many stations its ticket is scanned.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{BrasaError, BrasaResult};
use crate::models::{OrderDetails, OrderStatus, StatusTransition};
use crate::realtime::{ChangeEvent, ChangeFeed};
use crate::service::BrasaService;
use crate::session::Session;
use crate::store::Store;

/// Pulls the order id out of scanned text: the final `/`-separated segment,
/// which covers both a bare id and a full ticket URL.
pub fn extract_order_id(code: &str) -> BrasaResult<Uuid> {
  let segment = code.trim().rsplit('/').next().unwrap_or_default().trim();
  if segment.is_empty() {
    return Err(BrasaError::InvalidCode);
  }
  Uuid::parse_str(segment).map_err(|_| BrasaError::InvalidCode)
}

/// What the attendant hands over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickupReceipt {
  pub order_id: Uuid,
  pub customer_id: Uuid,
  pub quantity_handed_over: u64,
  pub free_units_included: u64,
  pub total_cents: i64,
  pub delivered_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PickupGuard {
  store: Arc<dyn Store>,
  feed: Arc<ChangeFeed>,
}

impl PickupGuard {
  pub fn new(store: Arc<dyn Store>, feed: Arc<ChangeFeed>) -> Self {
    Self { store, feed }
  }

  /// Validates the scanned code and marks the order DELIVERED.
  #[instrument(name = "PickupGuard::redeem", skip(self), err(Display))]
  pub async fn redeem(&self, code: &str) -> BrasaResult<PickupReceipt> {
    let order_id = extract_order_id(code)?;
    let details = self.store.order(order_id).await?.ok_or(BrasaError::OrderNotFound(order_id))?;
    reject_unless_paid(&details)?;

    let delivered_at = Utc::now();
    let won = self
      .store
      .transition(order_id, StatusTransition::HandOver { at: delivered_at })
      .await?;
    if !won {
      // Someone else moved the order between our read and our write.
      let current = self.store.order(order_id).await?.ok_or(BrasaError::OrderNotFound(order_id))?;
      warn!("Pickup for order {} lost a race; now {}.", order_id, current.order.status);
      reject_unless_paid(&current)?;
      return Err(BrasaError::InvalidStatus {
        order_id,
        status: current.order.status,
      });
    }

    self.feed.publish(ChangeEvent {
      order_id,
      customer_id: details.order.customer_id,
      status: OrderStatus::Delivered,
    });
    let receipt = PickupReceipt {
      order_id,
      customer_id: details.order.customer_id,
      quantity_handed_over: details.total_quantity(),
      free_units_included: details.free_units(),
      total_cents: details.order.total_cents,
      delivered_at,
    };
    info!(
      "Order {} handed over: {} unit(s), {} free.",
      order_id, receipt.quantity_handed_over, receipt.free_units_included
    );
    Ok(receipt)
  }
}

fn reject_unless_paid(details: &OrderDetails) -> BrasaResult<()> {
  let order_id = details.order.id;
  match details.order.status {
    OrderStatus::Paid => Ok(()),
    OrderStatus::Delivered => Err(BrasaError::AlreadyDelivered(order_id)),
    OrderStatus::AwaitingPayment => Err(BrasaError::PaymentPending(order_id)),
    status @ OrderStatus::Cancelled => Err(BrasaError::InvalidStatus { order_id, status }),
  }
}

impl BrasaService {
  pub fn pickup_guard(&self) -> PickupGuard {
    PickupGuard::new(self.store.clone(), self.feed.clone())
  }

  /// Pickup redemption on behalf of a signed-in operator.
  pub async fn redeem_pickup(&self, operator: &Session, code: &str) -> BrasaResult<PickupReceipt> {
    operator.require_admin()?;
    self.pickup_guard().redeem(code).await
  }
}
