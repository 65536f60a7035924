// core/src/store/memory.rs
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
  LineItem, Order, OrderDetails, OrderStatus, PaymentDetails, Product, Profile, StatusTransition,
};

#[derive(Default)]
struct Tables {
  products: HashMap<Uuid, Product>,
  orders: HashMap<Uuid, Order>,
  items: Vec<LineItem>,
  profiles: HashMap<Uuid, Profile>,
}

impl Tables {
  fn details(&self, order: &Order) -> OrderDetails {
    OrderDetails {
      order: order.clone(),
      items: self.items.iter().filter(|i| i.order_id == order.id).cloned().collect(),
    }
  }

  fn details_newest_first<'a>(&self, orders: impl Iterator<Item = &'a Order>) -> Vec<OrderDetails> {
    let mut out: Vec<OrderDetails> = orders.map(|o| self.details(o)).collect();
    out.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
    out
  }
}

/// Process-local store. Every operation runs under one lock, which makes each
/// call atomic.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn active_product(&self) -> StoreResult<Option<Product>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .products
        .values()
        .filter(|p| p.active)
        .min_by(|a, b| a.name.cmp(&b.name))
        .cloned(),
    )
  }

  async fn product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    Ok(self.tables.lock().products.get(&id).cloned())
  }

  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    let mut products: Vec<Product> = self.tables.lock().products.values().cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn save_product(&self, product: &Product) -> StoreResult<()> {
    self.tables.lock().products.insert(product.id, product.clone());
    Ok(())
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
    Ok(self.tables.lock().products.remove(&id).is_some())
  }

  async fn reserve_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<bool> {
    let mut tables = self.tables.lock();
    let product = tables.products.get_mut(&product_id).ok_or(StoreError::Missing(product_id))?;
    if product.stock < quantity {
      return Ok(false);
    }
    product.stock -= quantity;
    Ok(true)
  }

  async fn release_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let product = tables.products.get_mut(&product_id).ok_or(StoreError::Missing(product_id))?;
    product.stock = product.stock.saturating_add(quantity);
    Ok(())
  }

  async fn insert_order(&self, order: &Order, items: &[LineItem]) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    if let Some(stray) = items.iter().find(|i| i.order_id != order.id) {
      return Err(StoreError::Malformed(format!(
        "line item {} does not belong to order {}",
        stray.id, order.id
      )));
    }
    tables.orders.insert(order.id, order.clone());
    tables.items.extend_from_slice(items);
    Ok(())
  }

  async fn discard_order(&self, id: Uuid) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    tables.orders.remove(&id);
    tables.items.retain(|i| i.order_id != id);
    Ok(())
  }

  async fn attach_payment(&self, id: Uuid, payment: &PaymentDetails) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let order = tables.orders.get_mut(&id).ok_or(StoreError::Missing(id))?;
    order.gateway_reference = Some(payment.gateway_reference.clone());
    order.pix_copy_paste = Some(payment.copy_paste_code.clone());
    order.pix_qr_base64 = Some(payment.qr_code_base64.clone());
    Ok(())
  }

  async fn order(&self, id: Uuid) -> StoreResult<Option<OrderDetails>> {
    let tables = self.tables.lock();
    Ok(tables.orders.get(&id).map(|o| tables.details(o)))
  }

  async fn orders_for_customer(&self, customer_id: Uuid) -> StoreResult<Vec<OrderDetails>> {
    let tables = self.tables.lock();
    Ok(tables.details_newest_first(tables.orders.values().filter(|o| o.customer_id == customer_id)))
  }

  async fn all_orders(&self) -> StoreResult<Vec<OrderDetails>> {
    let tables = self.tables.lock();
    Ok(tables.details_newest_first(tables.orders.values()))
  }

  async fn transition(&self, id: Uuid, transition: StatusTransition) -> StoreResult<bool> {
    let mut tables = self.tables.lock();
    let Some(order) = tables.orders.get_mut(&id) else {
      return Ok(false);
    };
    if order.status != transition.from_status() {
      return Ok(false);
    }
    order.status = transition.to_status();
    if let StatusTransition::HandOver { at } = transition {
      order.delivered_at = Some(at);
    }
    Ok(true)
  }

  async fn confirm_payment_by_reference(&self, gateway_reference: &str) -> StoreResult<Option<Order>> {
    let mut tables = self.tables.lock();
    let order = tables.orders.values_mut().find(|o| {
      o.status == OrderStatus::AwaitingPayment && o.gateway_reference.as_deref() == Some(gateway_reference)
    });
    Ok(order.map(|o| {
      o.status = OrderStatus::Paid;
      o.clone()
    }))
  }

  async fn profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
    Ok(self.tables.lock().profiles.get(&user_id).cloned())
  }

  async fn profiles(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
    let tables = self.tables.lock();
    Ok(user_ids.iter().filter_map(|id| tables.profiles.get(id).cloned()).collect())
  }

  async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
    self.tables.lock().profiles.insert(profile.user_id, profile.clone());
    Ok(())
  }
}
