// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use brasa::models::{LineItem, Order, OrderDetails, OrderStatus, PaymentDetails, Product, Profile, StatusTransition};
use brasa::{
  BrasaConfig, BrasaService, Charge, ChargeRequest, ChargeStatus, FileStorage, GatewayError, LoyaltyConfig,
  MemoryStore, PaymentGateway, Session, Store, StoreError, StoreResult,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

// --- Tracing ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Gateway double ---

/// Opens a deterministic charge per order and remembers every request.
#[derive(Default)]
pub struct RecordingGateway {
  pub requests: Mutex<Vec<ChargeRequest>>,
  fail_charges: AtomicBool,
  hang_charges: AtomicBool,
  charge_delay: Mutex<Option<Duration>>,
  statuses: Mutex<HashMap<String, ChargeStatus>>,
}

impl RecordingGateway {
  pub fn failing() -> Self {
    let gateway = Self::default();
    gateway.fail_charges.store(true, Ordering::SeqCst);
    gateway
  }

  /// Accepts charge requests and never answers them.
  pub fn hanging() -> Self {
    let gateway = Self::default();
    gateway.hang_charges.store(true, Ordering::SeqCst);
    gateway
  }

  pub fn slow(delay: Duration) -> Self {
    let gateway = Self::default();
    *gateway.charge_delay.lock() = Some(delay);
    gateway
  }

  pub fn calls(&self) -> usize {
    self.requests.lock().len()
  }

  pub fn set_status(&self, reference: &str, status: ChargeStatus) {
    self.statuses.lock().insert(reference.to_string(), status);
  }

  pub fn reference_for(order_id: Uuid) -> String {
    format!("mp-{}", order_id.simple())
  }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
  async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
    self.requests.lock().push(request.clone());
    if self.hang_charges.load(Ordering::SeqCst) {
      std::future::pending::<()>().await;
    }
    let delay = *self.charge_delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    if self.fail_charges.load(Ordering::SeqCst) {
      return Err(GatewayError::Transport("connection refused".to_string()));
    }
    Ok(Charge {
      gateway_reference: Self::reference_for(request.order_id),
      copy_paste_code: format!("00020126BR.GOV.BCB.PIX{}", request.amount_cents),
      qr_code_base64: "iVBORw0KGgo=".to_string(),
    })
  }

  async fn charge_status(&self, gateway_reference: &str) -> Result<ChargeStatus, GatewayError> {
    Ok(
      self
        .statuses
        .lock()
        .get(gateway_reference)
        .cloned()
        .unwrap_or(ChargeStatus::Pending),
    )
  }
}

// --- Store double ---

/// A `MemoryStore` whose order lookups hang while `stall_lookups` is set.
pub struct StallingStore {
  pub inner: Arc<MemoryStore>,
  pub stall_lookups: AtomicBool,
}

impl StallingStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      stall_lookups: AtomicBool::new(true),
    }
  }
}

#[async_trait]
impl Store for StallingStore {
  async fn active_product(&self) -> StoreResult<Option<Product>> {
    self.inner.active_product().await
  }
  async fn product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    self.inner.product(id).await
  }
  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    self.inner.list_products().await
  }
  async fn save_product(&self, product: &Product) -> StoreResult<()> {
    self.inner.save_product(product).await
  }
  async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
    self.inner.delete_product(id).await
  }
  async fn reserve_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<bool> {
    self.inner.reserve_stock(product_id, quantity).await
  }
  async fn release_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<()> {
    self.inner.release_stock(product_id, quantity).await
  }
  async fn insert_order(&self, order: &Order, items: &[LineItem]) -> StoreResult<()> {
    self.inner.insert_order(order, items).await
  }
  async fn discard_order(&self, id: Uuid) -> StoreResult<()> {
    self.inner.discard_order(id).await
  }
  async fn attach_payment(&self, id: Uuid, payment: &PaymentDetails) -> StoreResult<()> {
    self.inner.attach_payment(id, payment).await
  }
  async fn order(&self, id: Uuid) -> StoreResult<Option<OrderDetails>> {
    if self.stall_lookups.load(Ordering::SeqCst) {
      std::future::pending::<()>().await;
    }
    self.inner.order(id).await
  }
  async fn orders_for_customer(&self, customer_id: Uuid) -> StoreResult<Vec<OrderDetails>> {
    self.inner.orders_for_customer(customer_id).await
  }
  async fn all_orders(&self) -> StoreResult<Vec<OrderDetails>> {
    self.inner.all_orders().await
  }
  async fn transition(&self, id: Uuid, transition: StatusTransition) -> StoreResult<bool> {
    self.inner.transition(id, transition).await
  }
  async fn confirm_payment_by_reference(&self, gateway_reference: &str) -> StoreResult<Option<Order>> {
    self.inner.confirm_payment_by_reference(gateway_reference).await
  }
  async fn profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
    self.inner.profile(user_id).await
  }
  async fn profiles(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
    self.inner.profiles(user_ids).await
  }
  async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
    self.inner.save_profile(profile).await
  }
}

// --- File storage double ---

#[derive(Default)]
pub struct MemoryFiles {
  pub files: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl FileStorage for MemoryFiles {
  async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, StoreError> {
    self.files.lock().insert(key.to_string(), bytes.to_vec());
    Ok(format!("https://files.test/avatars/{key}"))
  }
}

// --- Fixture ---

pub const BAG_PRICE: i64 = 1000;

pub struct Fixture {
  pub service: BrasaService,
  pub store: Arc<MemoryStore>,
  pub gateway: Arc<RecordingGateway>,
  pub files: Arc<MemoryFiles>,
  pub product: Product,
  pub customer: Session,
  pub admin: Session,
}

impl Fixture {
  pub async fn new() -> Self {
    Self::build(RecordingGateway::default(), 20, LoyaltyConfig::default()).await
  }

  pub async fn with_stock(stock: u32) -> Self {
    Self::build(RecordingGateway::default(), stock, LoyaltyConfig::default()).await
  }

  pub async fn with_gateway(gateway: RecordingGateway) -> Self {
    Self::build(gateway, 20, LoyaltyConfig::default()).await
  }

  pub async fn build(gateway: RecordingGateway, stock: u32, loyalty: LoyaltyConfig) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(gateway);
    let files = Arc::new(MemoryFiles::default());
    let product = Product {
      id: Uuid::new_v4(),
      name: "Carvão 5kg".to_string(),
      price_cents: BAG_PRICE,
      stock,
      active: true,
      created_at: Utc::now(),
    };
    store.save_product(&product).await.unwrap();

    let mut config = BrasaConfig::default();
    config.loyalty = loyalty;
    config.ticket_base_url = "https://brasa.test".to_string();
    let service = BrasaService::new(store.clone(), gateway.clone(), files.clone(), config);

    Self {
      service,
      store,
      gateway,
      files,
      product,
      customer: Session::customer(Uuid::new_v4(), "cliente@brasa.test"),
      admin: Session::admin(Uuid::new_v4(), "gerente@brasa.test"),
    }
  }

  pub async fn stock(&self) -> u32 {
    self.store.product(self.product.id).await.unwrap().unwrap().stock
  }

  pub async fn status_of(&self, order_id: Uuid) -> OrderStatus {
    self.store.order(order_id).await.unwrap().unwrap().order.status
  }

  /// Writes an order straight into the store, bypassing checkout.
  /// `items` are `(quantity, unit_price_cents)` pairs.
  pub async fn seed_order(&self, customer_id: Uuid, status: OrderStatus, items: &[(u32, i64)]) -> Uuid {
    self.seed_order_at(customer_id, status, items, Utc::now()).await
  }

  pub async fn seed_order_at(
    &self,
    customer_id: Uuid,
    status: OrderStatus,
    items: &[(u32, i64)],
    created_at: DateTime<Utc>,
  ) -> Uuid {
    let id = Uuid::new_v4();
    let items: Vec<LineItem> = items
      .iter()
      .map(|(qty, price)| LineItem::new(id, self.product.id, *qty, *price))
      .collect();
    let order = Order {
      id,
      customer_id,
      total_cents: items.iter().map(LineItem::subtotal_cents).sum(),
      status,
      created_at,
      delivered_at: None,
      gateway_reference: None,
      pix_copy_paste: None,
      pix_qr_base64: None,
    };
    self.store.insert_order(&order, &items).await.unwrap();
    id
  }

  /// Gives the customer enough delivered history for `rewards` free units.
  pub async fn earn_rewards(&self, rewards: u32) {
    let config = self.service.config().loyalty;
    let credits = rewards * config.reward_threshold();
    let bags = (i64::from(credits) * config.unit_reward_price_cents() / BAG_PRICE) as u32;
    self
      .seed_order(self.customer.user_id, OrderStatus::Delivered, &[(bags, BAG_PRICE)])
      .await;
  }
}
