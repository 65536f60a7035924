// core/src/gateway.rs

//! Port to the external PIX payment gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::PaymentDetails;

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("gateway unreachable: {0}")]
  Transport(String),

  #[error("gateway rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("unexpected gateway response: {0}")]
  MalformedResponse(String),
}

/// A request to open a PIX charge for one order.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
  pub order_id: Uuid,
  pub amount_cents: i64,
  pub payer_email: String,
  pub description: String,
}

impl ChargeRequest {
  /// Replaying a request with the same key must not open a second charge.
  pub fn idempotency_key(&self) -> String {
    self.order_id.to_string()
  }
}

/// What the gateway hands back for a freshly opened charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
  pub gateway_reference: String,
  pub copy_paste_code: String,
  pub qr_code_base64: String,
}

impl From<Charge> for PaymentDetails {
  fn from(charge: Charge) -> Self {
    PaymentDetails {
      gateway_reference: charge.gateway_reference,
      copy_paste_code: charge.copy_paste_code,
      qr_code_base64: charge.qr_code_base64,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeStatus {
  Pending,
  Approved,
  Rejected,
  Cancelled,
  Other(String),
}

impl ChargeStatus {
  pub fn from_gateway(status: &str) -> Self {
    match status {
      "pending" | "in_process" | "authorized" => ChargeStatus::Pending,
      "approved" => ChargeStatus::Approved,
      "rejected" => ChargeStatus::Rejected,
      "cancelled" | "refunded" | "charged_back" => ChargeStatus::Cancelled,
      other => ChargeStatus::Other(other.to_string()),
    }
  }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
  async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError>;
  async fn charge_status(&self, gateway_reference: &str) -> Result<ChargeStatus, GatewayError>;
}
