// storefront/src/pipelines/webhook_pipeline.rs

//! Payment notifications from Mercado Pago. The notification body is never
//! trusted for the status: the gateway is asked for the real one before an
//! order is confirmed.

use actix_web::web::Bytes;
use brasa::models::Order;
use brasa::workflow::skip_when;
use brasa::{BrasaError, BrasaService, ChargeStatus, Flow, Shared, Workflow};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{event, info, warn, Level};

/// Notification actions that may carry a payment status change.
pub const PAYMENT_ACTIONS: [&str; 2] = ["payment.created", "payment.updated"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
  pub action: String,
  pub payment_id: Option<String>,
}

impl PaymentNotification {
  pub fn concerns_payment(&self) -> bool {
    PAYMENT_ACTIONS.contains(&self.action.as_str())
  }
}

#[derive(Debug, Deserialize)]
struct RawNotification {
  #[serde(default)]
  action: Option<String>,
  #[serde(default)]
  data: Option<RawData>,
}

#[derive(Debug, Deserialize)]
struct RawData {
  #[serde(default)]
  id: Option<JsonValue>,
}

pub fn parse_notification(raw_payload: &[u8]) -> Result<PaymentNotification, BrasaError> {
  let raw: RawNotification = serde_json::from_slice(raw_payload)
    .map_err(|e| BrasaError::Validation(format!("Invalid JSON payload: {}", e)))?;
  let payment_id = match raw.data.and_then(|d| d.id) {
    Some(JsonValue::Number(n)) => Some(n.to_string()),
    Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
    _ => None,
  };
  Ok(PaymentNotification {
    action: raw.action.unwrap_or_default(),
    payment_id,
  })
}

pub struct WebhookCtxData {
  pub brasa: BrasaService,
  pub raw_payload: Bytes,
  pub notification: Option<PaymentNotification>,
  pub gateway_status: Option<ChargeStatus>,
  /// Set only when this notification moved an order to PAID.
  pub confirmed_order: Option<Order>,
}

impl WebhookCtxData {
  pub fn new(brasa: BrasaService, raw_payload: Bytes) -> Self {
    Self {
      brasa,
      raw_payload,
      notification: None,
      gateway_status: None,
      confirmed_order: None,
    }
  }

  fn payment_id(&self) -> Result<String, BrasaError> {
    self
      .notification
      .as_ref()
      .and_then(|n| n.payment_id.clone())
      .ok_or_else(|| BrasaError::Validation("Notification has no data.id".to_string()))
  }
}

pub fn webhook_workflow() -> Workflow<WebhookCtxData, BrasaError> {
  let mut wf = Workflow::<WebhookCtxData, BrasaError>::new(
    "payment_webhook",
    &[
      ("parse_notification", false, None),
      ("filter_action", false, None),
      ("query_gateway_status", false, None),
      (
        "confirm_payment",
        false,
        skip_when(|c: &WebhookCtxData| c.gateway_status != Some(ChargeStatus::Approved)),
      ),
    ],
  );

  wf.on_step("parse_notification", |ctx: Shared<WebhookCtxData>| {
    Box::pin(async move {
      let payload = ctx.read().raw_payload.clone();
      let notification = parse_notification(&payload)?;
      info!(action = %notification.action, payment_id = ?notification.payment_id, "Webhook: notification parsed.");
      ctx.write().notification = Some(notification);
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });

  wf.on_step("filter_action", |ctx: Shared<WebhookCtxData>| {
    Box::pin(async move {
      let relevant = ctx.read().notification.as_ref().is_some_and(|n| n.concerns_payment());
      if !relevant {
        info!("Webhook: action is not a payment change, acknowledging only.");
        return Ok::<_, BrasaError>(Flow::Stop);
      }
      Ok(Flow::Continue)
    })
  });

  wf.on_step("query_gateway_status", |ctx: Shared<WebhookCtxData>| {
    Box::pin(async move {
      let (gateway, payment_id) = {
        let guard = ctx.read();
        (guard.brasa.gateway().clone(), guard.payment_id()?)
      };
      let status = gateway.charge_status(&payment_id).await?;
      event!(Level::INFO, payment_id = %payment_id, status = ?status, "Webhook: gateway status fetched.");
      ctx.write().gateway_status = Some(status);
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });

  wf.on_step("confirm_payment", |ctx: Shared<WebhookCtxData>| {
    Box::pin(async move {
      let (brasa, payment_id) = {
        let guard = ctx.read();
        (guard.brasa.clone(), guard.payment_id()?)
      };
      match brasa.confirm_gateway_payment(&payment_id).await? {
        Some(order) => {
          info!(order_id = %order.id, "Webhook: order marked as paid.");
          ctx.write().confirmed_order = Some(order);
        }
        None => warn!(payment_id = %payment_id, "Webhook: no order awaiting payment for this reference."),
      }
      Ok::<_, BrasaError>(Flow::Continue)
    })
  });

  wf
}

pub fn register_webhook_workflow(brasa: &BrasaService) {
  brasa.workflows().register(webhook_workflow());
  info!("Payment webhook workflow registered.");
}
