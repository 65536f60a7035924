// core/src/store/mod.rs

//! Persistence port. Every status change goes through a conditional update so
//! concurrent callers cannot both win the same transition.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LineItem, Order, OrderDetails, PaymentDetails, Product, Profile, StatusTransition};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("stored row is malformed: {0}")]
  Malformed(String),

  #[error("record {0} not found")]
  Missing(Uuid),

  #[error("storage backend failure: {0}")]
  Backend(#[source] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync + 'static {
  // --- catalogue ---

  /// The product currently on sale, if any. Ties resolve by name.
  async fn active_product(&self) -> StoreResult<Option<Product>>;
  async fn product(&self, id: Uuid) -> StoreResult<Option<Product>>;
  async fn list_products(&self) -> StoreResult<Vec<Product>>;
  /// Inserts or replaces by id.
  async fn save_product(&self, product: &Product) -> StoreResult<()>;
  async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;

  /// Decrements stock by `quantity` only if at least that much remains.
  /// Returns `false` when stock was insufficient (nothing changes).
  async fn reserve_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<bool>;
  async fn release_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<()>;

  // --- orders ---

  /// Writes the order and all its line items, or nothing.
  async fn insert_order(&self, order: &Order, items: &[LineItem]) -> StoreResult<()>;
  /// Removes an order and its items. Used to roll back a failed checkout.
  async fn discard_order(&self, id: Uuid) -> StoreResult<()>;
  async fn attach_payment(&self, id: Uuid, payment: &PaymentDetails) -> StoreResult<()>;

  async fn order(&self, id: Uuid) -> StoreResult<Option<OrderDetails>>;
  /// Newest first.
  async fn orders_for_customer(&self, customer_id: Uuid) -> StoreResult<Vec<OrderDetails>>;
  /// Every order, newest first.
  async fn all_orders(&self) -> StoreResult<Vec<OrderDetails>>;

  /// Applies `transition` only if the order is currently in its source status.
  /// Returns `true` when this call performed the change.
  async fn transition(&self, id: Uuid, transition: StatusTransition) -> StoreResult<bool>;

  /// Confirms payment for the order holding `gateway_reference` if it is still
  /// awaiting payment. Returns the updated order when this call changed it.
  async fn confirm_payment_by_reference(&self, gateway_reference: &str) -> StoreResult<Option<Order>>;

  // --- profiles ---

  async fn profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;
  async fn profiles(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>>;
  async fn save_profile(&self, profile: &Profile) -> StoreResult<()>;
}
