// core/src/checkout.rs

//! Order placement. Runs as a workflow so that a failure in a later step
//! (gateway down, write rejected) rolls back stock and the order row.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn, Instrument};
use uuid::Uuid;

use crate::error::{BrasaError, BrasaResult};
use crate::gateway::{Charge, ChargeRequest, GatewayError};
use crate::loyalty::LoyaltyLedger;
use crate::models::{LineItem, Order, OrderStatus, PaymentDetails, Product};
use crate::service::BrasaService;
use crate::session::Session;
use crate::workflow::{skip_when, Flow, FlowOutcome, Shared, Workflow, WorkflowError};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
  pub quantity: u32,
  #[serde(default)]
  pub redeem_reward: bool,
}

/// How a requested quantity splits into paid and free units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pricing {
  pub paid_units: u32,
  pub reward_units: u32,
  pub unit_price_cents: i64,
  pub total_cents: i64,
}

/// Redeeming a reward makes exactly one of the `quantity` units free.
pub fn price_order(quantity: u32, redeem_reward: bool, unit_price_cents: i64) -> BrasaResult<Pricing> {
  if quantity == 0 {
    return Err(BrasaError::InvalidQuantity);
  }
  let reward_units = u32::from(redeem_reward);
  let paid_units = quantity - reward_units;
  Ok(Pricing {
    paid_units,
    reward_units,
    unit_price_cents,
    total_cents: i64::from(paid_units) * unit_price_cents,
  })
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
  pub order: Order,
  pub items: Vec<LineItem>,
  pub ticket_url: String,
  /// PIX data when the order still needs paying.
  pub pix: Option<PaymentDetails>,
  /// Subtract from any locally cached credit balance.
  pub reward_credits_spent: u32,
}

pub(crate) struct CheckoutCtxData {
  service: BrasaService,
  customer: Session,
  request: CheckoutRequest,
  product: Option<Product>,
  pricing: Option<Pricing>,
  order: Option<Order>,
  items: Vec<LineItem>,
  charge: Option<Charge>,
}

impl CheckoutCtxData {
  fn new(service: BrasaService, customer: Session, request: CheckoutRequest) -> Self {
    Self {
      service,
      customer,
      request,
      product: None,
      pricing: None,
      order: None,
      items: Vec::new(),
      charge: None,
    }
  }

  fn total_cents(&self) -> i64 {
    self.pricing.map_or(0, |p| p.total_cents)
  }

  fn product_id(&self) -> Result<Uuid, BrasaError> {
    self.product.as_ref().map(|p| p.id).ok_or_else(|| missing("product"))
  }

  fn order_id(&self) -> Result<Uuid, BrasaError> {
    self.order.as_ref().map(|o| o.id).ok_or_else(|| missing("order"))
  }
}

fn missing(what: &str) -> BrasaError {
  BrasaError::Workflow(WorkflowError::Configuration {
    message: format!("checkout step ran before {what} was set"),
  })
}

pub(crate) fn checkout_workflow() -> Workflow<CheckoutCtxData, BrasaError> {
  let mut wf = Workflow::<CheckoutCtxData, BrasaError>::new(
    "checkout",
    &[
      ("price_order", false, None),
      (
        "verify_reward_balance",
        false,
        skip_when(|c: &CheckoutCtxData| !c.request.redeem_reward),
      ),
      ("reserve_stock", false, None),
      ("record_order", false, None),
      ("request_pix_charge", false, skip_when(|c: &CheckoutCtxData| c.total_cents() == 0)),
      ("attach_payment", false, skip_when(|c: &CheckoutCtxData| c.charge.is_none())),
    ],
  );

  wf.on_step("price_order", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, request) = {
        let guard = ctx.read();
        (guard.service.store.clone(), guard.request.clone())
      };
      if request.quantity == 0 {
        return Err(BrasaError::InvalidQuantity);
      }
      let product = store.active_product().await?.ok_or(BrasaError::ProductUnavailable)?;
      if product.stock < request.quantity {
        return Err(BrasaError::InsufficientStock {
          requested: request.quantity,
        });
      }
      let pricing = price_order(request.quantity, request.redeem_reward, product.price_cents)?;
      info!(
        "Checkout: {} x {} ({} free), total {} cents.",
        request.quantity, product.name, pricing.reward_units, pricing.total_cents
      );

      let mut guard = ctx.write();
      guard.product = Some(product);
      guard.pricing = Some(pricing);
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });

  wf.on_step("verify_reward_balance", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, loyalty, customer_id) = {
        let guard = ctx.read();
        (
          guard.service.store.clone(),
          guard.service.config.loyalty,
          guard.customer.user_id,
        )
      };
      let history = store.orders_for_customer(customer_id).await?;
      let ledger = LoyaltyLedger::from_history(&history, &loyalty);
      if !ledger.can_redeem() {
        warn!(
          "Checkout (Customer {}): reward requested with {} credit(s) available.",
          customer_id, ledger.available_credits
        );
        return Err(BrasaError::NoRewardAvailable);
      }
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });

  wf.on_step("reserve_stock", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, product_id, quantity) = {
        let guard = ctx.read();
        (guard.service.store.clone(), guard.product_id()?, guard.request.quantity)
      };
      if !store.reserve_stock(product_id, quantity).await? {
        return Err(BrasaError::InsufficientStock { requested: quantity });
      }
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });
  wf.compensate_step("reserve_stock", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, product_id, quantity) = {
        let guard = ctx.read();
        (guard.service.store.clone(), guard.product_id()?, guard.request.quantity)
      };
      store.release_stock(product_id, quantity).await?;
      info!("Checkout: released {} unit(s) of stock.", quantity);
      Ok::<_, BrasaError>(())
    })
  });

  wf.on_step("record_order", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, customer_id, product_id, pricing) = {
        let guard = ctx.read();
        let pricing = guard.pricing.ok_or_else(|| missing("pricing"))?;
        (guard.service.store.clone(), guard.customer.user_id, guard.product_id()?, pricing)
      };

      let order = Order {
        id: Uuid::new_v4(),
        customer_id,
        total_cents: pricing.total_cents,
        status: if pricing.total_cents == 0 {
          OrderStatus::Paid
        } else {
          OrderStatus::AwaitingPayment
        },
        created_at: Utc::now(),
        delivered_at: None,
        gateway_reference: None,
        pix_copy_paste: None,
        pix_qr_base64: None,
      };
      let mut items = Vec::with_capacity(2);
      if pricing.paid_units > 0 {
        items.push(LineItem::new(order.id, product_id, pricing.paid_units, pricing.unit_price_cents));
      }
      if pricing.reward_units > 0 {
        items.push(LineItem::new(order.id, product_id, pricing.reward_units, 0));
      }

      store.insert_order(&order, &items).await?;
      info!("Checkout (Order {}): recorded with status {}.", order.id, order.status);

      let mut guard = ctx.write();
      guard.order = Some(order);
      guard.items = items;
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });
  wf.compensate_step("record_order", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, order_id) = {
        let guard = ctx.read();
        (guard.service.store.clone(), guard.order_id()?)
      };
      store.discard_order(order_id).await?;
      info!("Checkout (Order {}): discarded.", order_id);
      Ok::<_, BrasaError>(())
    })
  });

  wf.on_step("request_pix_charge", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (gateway, request, timeout) = {
        let guard = ctx.read();
        let request = ChargeRequest {
          order_id: guard.order_id()?,
          amount_cents: guard.total_cents(),
          payer_email: guard.customer.email.clone(),
          description: guard.service.config.payment_description.clone(),
        };
        (guard.service.gateway.clone(), request, guard.service.config.charge_timeout)
      };
      let charge = tokio::time::timeout(timeout, gateway.create_charge(&request))
        .await
        .map_err(|_| GatewayError::Transport(format!("no answer within {}s", timeout.as_secs_f32())))??;
      info!(
        "Checkout (Order {}): PIX charge {} opened.",
        request.order_id, charge.gateway_reference
      );
      ctx.write().charge = Some(charge);
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });

  wf.on_step("attach_payment", |ctx: Shared<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, order_id, payment) = {
        let guard = ctx.read();
        let charge = guard.charge.clone().ok_or_else(|| missing("charge"))?;
        (guard.service.store.clone(), guard.order_id()?, PaymentDetails::from(charge))
      };
      store.attach_payment(order_id, &payment).await?;

      let mut guard = ctx.write();
      if let Some(order) = guard.order.as_mut() {
        order.gateway_reference = Some(payment.gateway_reference);
        order.pix_copy_paste = Some(payment.copy_paste_code);
        order.pix_qr_base64 = Some(payment.qr_code_base64);
      }
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });

  wf
}

impl BrasaService {
  /// Places an order for `quantity` units of the active product.
  ///
  /// Zero-total orders (a single redeemed unit) are created already PAID and
  /// never reach the gateway. Otherwise the order waits for payment with its
  /// PIX data attached.
  ///
  /// The workflow runs on its own task, so a caller that goes away mid-checkout
  /// still leaves either a complete order or none.
  #[instrument(
    name = "BrasaService::place_order",
    skip(self, customer),
    fields(customer_id = %customer.user_id),
    err(Display)
  )]
  pub async fn place_order(&self, customer: &Session, request: CheckoutRequest) -> BrasaResult<PlacedOrder> {
    let reward_units = u32::from(request.redeem_reward);
    let ctx = Shared::new(CheckoutCtxData::new(self.clone(), customer.clone(), request));

    let run = tokio::spawn({
      let service = self.clone();
      let ctx = ctx.clone();
      async move {
        let outcome = service.workflows.run(ctx.clone()).await?;
        if outcome == FlowOutcome::Completed {
          if let Some(order) = ctx.read().order.as_ref() {
            service.publish(order);
          }
        }
        Ok::<_, BrasaError>(outcome)
      }
      .instrument(tracing::Span::current())
    });
    let outcome = run.await.map_err(|e| {
      BrasaError::Workflow(WorkflowError::Configuration {
        message: format!("checkout task did not finish: {e}"),
      })
    })??;

    match outcome {
      FlowOutcome::Completed => {}
      FlowOutcome::Stopped => {
        return Err(BrasaError::Workflow(WorkflowError::Configuration {
          message: "checkout workflow stopped before completing".to_string(),
        }))
      }
    }

    let (order, items) = {
      let mut guard = ctx.write();
      let order = guard.order.take().ok_or_else(|| missing("order"))?;
      (order, std::mem::take(&mut guard.items))
    };

    Ok(PlacedOrder {
      ticket_url: self.config.ticket_url(order.id),
      pix: order.payment(),
      reward_credits_spent: reward_units * self.config.loyalty.reward_threshold(),
      order,
      items,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_redeemed_unit_is_free() {
    let pricing = price_order(1, true, 1500).unwrap();
    assert_eq!(pricing.paid_units, 0);
    assert_eq!(pricing.reward_units, 1);
    assert_eq!(pricing.total_cents, 0);
  }

  #[test]
  fn redeeming_discounts_exactly_one_unit() {
    let pricing = price_order(3, true, 1500).unwrap();
    assert_eq!(pricing.paid_units, 2);
    assert_eq!(pricing.total_cents, 3000);
  }

  #[test]
  fn zero_quantity_is_rejected() {
    assert!(matches!(price_order(0, false, 1500), Err(BrasaError::InvalidQuantity)));
  }
}
