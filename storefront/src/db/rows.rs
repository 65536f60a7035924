// storefront/src/db/rows.rs

//! Raw table rows. Each converts into its domain record only if every column
//! holds a value the domain accepts.

use brasa::models::{LineItem, Order, OrderStatus, Product, Profile};
use brasa::StoreError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub stock: i32,
  pub active: bool,
  pub created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
  type Error = StoreError;

  fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
    let stock = u32::try_from(row.stock)
      .map_err(|_| StoreError::Malformed(format!("product {} has negative stock {}", row.id, row.stock)))?;
    if row.price_cents < 0 {
      return Err(StoreError::Malformed(format!(
        "product {} has negative price {}",
        row.id, row.price_cents
      )));
    }
    Ok(Product {
      id: row.id,
      name: row.name,
      price_cents: row.price_cents,
      stock,
      active: row.active,
      created_at: row.created_at,
    })
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub total_cents: i64,
  pub status: String,
  pub created_at: DateTime<Utc>,
  pub delivered_at: Option<DateTime<Utc>>,
  pub gateway_reference: Option<String>,
  pub pix_copy_paste: Option<String>,
  pub pix_qr_base64: Option<String>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let status = row
      .status
      .parse::<OrderStatus>()
      .map_err(|e| StoreError::Malformed(format!("order {}: {}", row.id, e)))?;
    if row.total_cents < 0 {
      return Err(StoreError::Malformed(format!(
        "order {} has negative total {}",
        row.id, row.total_cents
      )));
    }
    Ok(Order {
      id: row.id,
      customer_id: row.customer_id,
      total_cents: row.total_cents,
      status,
      created_at: row.created_at,
      delivered_at: row.delivered_at,
      gateway_reference: row.gateway_reference,
      pix_copy_paste: row.pix_copy_paste,
      pix_qr_base64: row.pix_qr_base64,
    })
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct LineItemRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price_cents: i64,
}

impl TryFrom<LineItemRow> for LineItem {
  type Error = StoreError;

  fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
    let quantity = u32::try_from(row.quantity)
      .ok()
      .filter(|q| *q > 0)
      .ok_or_else(|| StoreError::Malformed(format!("line item {} has quantity {}", row.id, row.quantity)))?;
    if row.unit_price_cents < 0 {
      return Err(StoreError::Malformed(format!(
        "line item {} has negative unit price",
        row.id
      )));
    }
    Ok(LineItem {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      quantity,
      unit_price_cents: row.unit_price_cents,
    })
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
  pub user_id: Uuid,
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub avatar_url: Option<String>,
}

impl From<ProfileRow> for Profile {
  fn from(row: ProfileRow) -> Self {
    Profile {
      user_id: row.user_id,
      full_name: row.full_name,
      phone: row.phone,
      avatar_url: row.avatar_url,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn order_row(status: &str) -> OrderRow {
    OrderRow {
      id: Uuid::new_v4(),
      customer_id: Uuid::new_v4(),
      total_cents: 2000,
      status: status.to_string(),
      created_at: Utc::now(),
      delivered_at: None,
      gateway_reference: None,
      pix_copy_paste: None,
      pix_qr_base64: None,
    }
  }

  #[test]
  fn unknown_status_is_malformed() {
    assert_eq!(Order::try_from(order_row("PAID")).unwrap().status, OrderStatus::Paid);
    let err = Order::try_from(order_row("PAGO")).unwrap_err();
    assert!(matches!(err, StoreError::Malformed(m) if m.contains("PAGO")));
  }

  #[test]
  fn non_positive_quantities_and_negative_stock_are_malformed() {
    let item = LineItemRow {
      id: Uuid::new_v4(),
      order_id: Uuid::new_v4(),
      product_id: Uuid::new_v4(),
      quantity: 0,
      unit_price_cents: 1000,
    };
    assert!(LineItem::try_from(item).is_err());

    let product = ProductRow {
      id: Uuid::new_v4(),
      name: "Saco 5kg".to_string(),
      price_cents: 2500,
      stock: -1,
      active: true,
      created_at: Utc::now(),
    };
    assert!(Product::try_from(product).is_err());
  }
}
