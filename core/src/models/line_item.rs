// core/src/models/line_item.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: u32,
  /// Price per unit at order time. Zero marks a loyalty reward unit.
  pub unit_price_cents: i64,
}

impl LineItem {
  pub fn new(order_id: Uuid, product_id: Uuid, quantity: u32, unit_price_cents: i64) -> Self {
    Self {
      id: Uuid::new_v4(),
      order_id,
      product_id,
      quantity,
      unit_price_cents,
    }
  }

  pub fn is_reward(&self) -> bool {
    self.unit_price_cents == 0
  }

  pub fn subtotal_cents(&self) -> i64 {
    i64::from(self.quantity) * self.unit_price_cents
  }
}
