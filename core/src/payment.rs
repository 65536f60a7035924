// core/src/payment.rs

//! Moving orders from AWAITING_PAYMENT to PAID, either by an administrator
//! or on the gateway's word.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{BrasaError, BrasaResult};
use crate::models::{Order, OrderStatus, StatusTransition};
use crate::service::BrasaService;
use crate::session::Session;

impl BrasaService {
  /// Manual approval from the back office.
  ///
  /// Approving an order that is already PAID succeeds without changing it.
  #[instrument(name = "BrasaService::approve_payment", skip(self, admin), err(Display))]
  pub async fn approve_payment(&self, admin: &Session, order_id: Uuid) -> BrasaResult<Order> {
    admin.require_admin()?;

    let changed = self.store.transition(order_id, StatusTransition::ConfirmPayment).await?;
    let details = self.store.order(order_id).await?.ok_or(BrasaError::OrderNotFound(order_id))?;
    let order = details.order;

    if changed {
      info!("Payment for order {} approved by {}.", order_id, admin.email);
      self.publish(&order);
      return Ok(order);
    }
    match order.status {
      OrderStatus::Paid => Ok(order),
      status => Err(BrasaError::InvalidStatus { order_id, status }),
    }
  }

  /// Marks the order carrying `gateway_reference` as PAID once the gateway
  /// reports the charge approved. Returns the order when this call changed it;
  /// `None` for unknown references and for orders already past payment.
  #[instrument(name = "BrasaService::confirm_gateway_payment", skip(self), err(Display))]
  pub async fn confirm_gateway_payment(&self, gateway_reference: &str) -> BrasaResult<Option<Order>> {
    let updated = self.store.confirm_payment_by_reference(gateway_reference).await?;
    match &updated {
      Some(order) => {
        info!("Gateway confirmed payment {} for order {}.", gateway_reference, order.id);
        self.publish(order);
      }
      None => info!("Gateway payment {} matched no order awaiting payment.", gateway_reference),
    }
    Ok(updated)
  }
}
