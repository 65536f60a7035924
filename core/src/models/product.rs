// core/src/models/product.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub stock: u32,
  pub active: bool,
  pub created_at: DateTime<Utc>,
}

/// Admin input for creating or editing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
  pub name: String,
  pub price_cents: i64,
  pub stock: u32,
  #[serde(default = "default_active")]
  pub active: bool,
}

fn default_active() -> bool {
  true
}
