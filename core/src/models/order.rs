// core/src/models/order.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::line_item::LineItem;

/// Lifecycle of an order. Only [`OrderStatus::AwaitingPayment`] -> `Paid` and
/// `Paid` -> `Delivered` are ever applied by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  AwaitingPayment,
  Paid,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::AwaitingPayment => "AWAITING_PAYMENT",
      OrderStatus::Paid => "PAID",
      OrderStatus::Delivered => "DELIVERED",
      OrderStatus::Cancelled => "CANCELLED",
    }
  }

  /// Orders in these states count as sold.
  pub fn is_settled(&self) -> bool {
    matches!(self, OrderStatus::Paid | OrderStatus::Delivered)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "AWAITING_PAYMENT" => Ok(OrderStatus::AwaitingPayment),
      "PAID" => Ok(OrderStatus::Paid),
      "DELIVERED" => Ok(OrderStatus::Delivered),
      "CANCELLED" => Ok(OrderStatus::Cancelled),
      other => Err(UnknownStatus(other.to_string())),
    }
  }
}

/// The two guarded transitions the store knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
  /// AWAITING_PAYMENT -> PAID
  ConfirmPayment,
  /// PAID -> DELIVERED, stamping `delivered_at`.
  HandOver { at: DateTime<Utc> },
}

impl StatusTransition {
  pub fn from_status(&self) -> OrderStatus {
    match self {
      StatusTransition::ConfirmPayment => OrderStatus::AwaitingPayment,
      StatusTransition::HandOver { .. } => OrderStatus::Paid,
    }
  }

  pub fn to_status(&self) -> OrderStatus {
    match self {
      StatusTransition::ConfirmPayment => OrderStatus::Paid,
      StatusTransition::HandOver { .. } => OrderStatus::Delivered,
    }
  }
}

/// PIX charge data attached to an order once the gateway issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
  pub gateway_reference: String,
  pub copy_paste_code: String,
  pub qr_code_base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub customer_id: Uuid,
  /// Sum of quantity * unit price over the order's line items, in cents.
  pub total_cents: i64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub delivered_at: Option<DateTime<Utc>>,
  pub gateway_reference: Option<String>,
  pub pix_copy_paste: Option<String>,
  pub pix_qr_base64: Option<String>,
}

impl Order {
  pub fn payment(&self) -> Option<PaymentDetails> {
    match (&self.gateway_reference, &self.pix_copy_paste, &self.pix_qr_base64) {
      (Some(reference), Some(code), Some(qr)) => Some(PaymentDetails {
        gateway_reference: reference.clone(),
        copy_paste_code: code.clone(),
        qr_code_base64: qr.clone(),
      }),
      _ => None,
    }
  }
}

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<LineItem>,
}

impl OrderDetails {
  pub fn total_quantity(&self) -> u64 {
    self.items.iter().map(|item| u64::from(item.quantity)).sum()
  }

  pub fn free_units(&self) -> u64 {
    self
      .items
      .iter()
      .filter(|item| item.is_reward())
      .map(|item| u64::from(item.quantity))
      .sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_strings_parse_back() {
    for status in [
      OrderStatus::AwaitingPayment,
      OrderStatus::Paid,
      OrderStatus::Delivered,
      OrderStatus::Cancelled,
    ] {
      assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
    }
  }

  #[test]
  fn unknown_status_is_rejected() {
    assert_eq!(
      "RETIRADO".parse::<OrderStatus>(),
      Err(UnknownStatus("RETIRADO".to_string()))
    );
  }
}
