// storefront/src/db/pg_store.rs

use async_trait::async_trait;
use brasa::models::{LineItem, Order, OrderDetails, OrderStatus, PaymentDetails, Product, Profile, StatusTransition};
use brasa::{Store, StoreError, StoreResult};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{event, instrument, Level};
use uuid::Uuid;

use super::rows::{LineItemRow, OrderRow, ProductRow, ProfileRow};

const PRODUCT_COLUMNS: &str = "id, name, price_cents, stock, active, created_at";
const ORDER_COLUMNS: &str =
  "id, customer_id, total_cents, status, created_at, delivered_at, gateway_reference, pix_copy_paste, pix_qr_base64";
const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price_cents";

/// PostgreSQL-backed [`Store`]. Status changes are single conditional
/// `UPDATE`s, so the database arbitrates concurrent callers.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(&self.pool).await
  }

  async fn items_for(&self, order_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<LineItem>>> {
    let rows = sqlx::query_as::<_, LineItemRow>(&format!(
      "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY unit_price_cents DESC, id"
    ))
    .bind(order_ids)
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;

    let mut grouped: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
    for row in rows {
      let item = LineItem::try_from(row)?;
      grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
  }

  async fn with_items(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<OrderDetails>> {
    let orders = rows.into_iter().map(Order::try_from).collect::<StoreResult<Vec<_>>>()?;
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items = self.items_for(&ids).await?;
    Ok(
      orders
        .into_iter()
        .map(|order| OrderDetails {
          items: items.remove(&order.id).unwrap_or_default(),
          order,
        })
        .collect(),
    )
  }

  async fn product_exists(&self, id: Uuid) -> StoreResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
      .bind(id)
      .fetch_one(&self.pool)
      .await
      .map_err(backend)
  }
}

fn backend(err: sqlx::Error) -> StoreError {
  event!(Level::ERROR, error = %err, "Database operation failed.");
  StoreError::Backend(anyhow::Error::new(err))
}

fn to_i32(value: u32, what: &str) -> StoreResult<i32> {
  i32::try_from(value).map_err(|_| StoreError::Malformed(format!("{what} {value} does not fit the column")))
}

#[async_trait]
impl Store for PgStore {
  async fn active_product(&self) -> StoreResult<Option<Product>> {
    sqlx::query_as::<_, ProductRow>(&format!(
      "SELECT {PRODUCT_COLUMNS} FROM products WHERE active ORDER BY name, id LIMIT 1"
    ))
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?
    .map(Product::try_from)
    .transpose()
  }

  async fn product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?
      .map(Product::try_from)
      .transpose()
  }

  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id"))
      .fetch_all(&self.pool)
      .await
      .map_err(backend)?
      .into_iter()
      .map(Product::try_from)
      .collect()
  }

  #[instrument(name = "PgStore::save_product", skip(self, product), fields(product_id = %product.id))]
  async fn save_product(&self, product: &Product) -> StoreResult<()> {
    sqlx::query(
      "INSERT INTO products (id, name, price_cents, stock, active, created_at) VALUES ($1, $2, $3, $4, $5, $6) \
       ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, price_cents = EXCLUDED.price_cents, \
       stock = EXCLUDED.stock, active = EXCLUDED.active",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(to_i32(product.stock, "stock")?)
    .bind(product.active)
    .bind(product.created_at)
    .execute(&self.pool)
    .await
    .map_err(backend)?;
    Ok(())
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "PgStore::reserve_stock", skip(self))]
  async fn reserve_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<bool> {
    let quantity = to_i32(quantity, "quantity")?;
    let result = sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
      .bind(product_id)
      .bind(quantity)
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    if result.rows_affected() == 1 {
      return Ok(true);
    }
    if self.product_exists(product_id).await? {
      Ok(false)
    } else {
      Err(StoreError::Missing(product_id))
    }
  }

  #[instrument(name = "PgStore::release_stock", skip(self))]
  async fn release_stock(&self, product_id: Uuid, quantity: u32) -> StoreResult<()> {
    let result = sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
      .bind(product_id)
      .bind(to_i32(quantity, "quantity")?)
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    if result.rows_affected() == 0 {
      return Err(StoreError::Missing(product_id));
    }
    Ok(())
  }

  #[instrument(name = "PgStore::insert_order", skip(self, order, items), fields(order_id = %order.id, items = items.len()))]
  async fn insert_order(&self, order: &Order, items: &[LineItem]) -> StoreResult<()> {
    if let Some(stray) = items.iter().find(|i| i.order_id != order.id) {
      return Err(StoreError::Malformed(format!(
        "line item {} does not belong to order {}",
        stray.id, order.id
      )));
    }

    let mut tx = self.pool.begin().await.map_err(backend)?;
    sqlx::query(&format!(
      "INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
    ))
    .bind(order.id)
    .bind(order.customer_id)
    .bind(order.total_cents)
    .bind(order.status.as_str())
    .bind(order.created_at)
    .bind(order.delivered_at)
    .bind(&order.gateway_reference)
    .bind(&order.pix_copy_paste)
    .bind(&order.pix_qr_base64)
    .execute(&mut *tx)
    .await
    .map_err(backend)?;

    for item in items {
      sqlx::query(&format!("INSERT INTO order_items ({ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5)"))
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(to_i32(item.quantity, "quantity")?)
        .bind(item.unit_price_cents)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;
    }
    // Dropping `tx` without commit rolls back, so an early `?` leaves nothing behind.
    tx.commit().await.map_err(backend)
  }

  async fn discard_order(&self, id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(backend)?;
    Ok(())
  }

  async fn attach_payment(&self, id: Uuid, payment: &PaymentDetails) -> StoreResult<()> {
    let result = sqlx::query(
      "UPDATE orders SET gateway_reference = $2, pix_copy_paste = $3, pix_qr_base64 = $4 WHERE id = $1",
    )
    .bind(id)
    .bind(&payment.gateway_reference)
    .bind(&payment.copy_paste_code)
    .bind(&payment.qr_code_base64)
    .execute(&self.pool)
    .await
    .map_err(backend)?;
    if result.rows_affected() == 0 {
      return Err(StoreError::Missing(id));
    }
    Ok(())
  }

  async fn order(&self, id: Uuid) -> StoreResult<Option<OrderDetails>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    match row {
      Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn orders_for_customer(&self, customer_id: Uuid) -> StoreResult<Vec<OrderDetails>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC"
    ))
    .bind(customer_id)
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;
    self.with_items(rows).await
  }

  async fn all_orders(&self) -> StoreResult<Vec<OrderDetails>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"))
      .fetch_all(&self.pool)
      .await
      .map_err(backend)?;
    self.with_items(rows).await
  }

  #[instrument(name = "PgStore::transition", skip(self))]
  async fn transition(&self, id: Uuid, transition: StatusTransition) -> StoreResult<bool> {
    let from = transition.from_status().as_str();
    let to = transition.to_status().as_str();
    let result = match transition {
      StatusTransition::ConfirmPayment => {
        sqlx::query("UPDATE orders SET status = $3 WHERE id = $1 AND status = $2")
          .bind(id)
          .bind(from)
          .bind(to)
          .execute(&self.pool)
          .await
      }
      StatusTransition::HandOver { at } => {
        sqlx::query("UPDATE orders SET status = $3, delivered_at = $4 WHERE id = $1 AND status = $2")
          .bind(id)
          .bind(from)
          .bind(to)
          .bind(at)
          .execute(&self.pool)
          .await
      }
    }
    .map_err(backend)?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "PgStore::confirm_payment_by_reference", skip(self))]
  async fn confirm_payment_by_reference(&self, gateway_reference: &str) -> StoreResult<Option<Order>> {
    sqlx::query_as::<_, OrderRow>(&format!(
      "UPDATE orders SET status = $3 WHERE gateway_reference = $1 AND status = $2 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(gateway_reference)
    .bind(OrderStatus::AwaitingPayment.as_str())
    .bind(OrderStatus::Paid.as_str())
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?
    .map(Order::try_from)
    .transpose()
  }

  async fn profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
    let row = sqlx::query_as::<_, ProfileRow>(
      "SELECT user_id, full_name, phone, avatar_url FROM profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    Ok(row.map(Profile::from))
  }

  async fn profiles(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
    let rows = sqlx::query_as::<_, ProfileRow>(
      "SELECT user_id, full_name, phone, avatar_url FROM profiles WHERE user_id = ANY($1)",
    )
    .bind(user_ids)
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;
    Ok(rows.into_iter().map(Profile::from).collect())
  }

  async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
    sqlx::query(
      "INSERT INTO profiles (user_id, full_name, phone, avatar_url, updated_at) VALUES ($1, $2, $3, $4, NOW()) \
       ON CONFLICT (user_id) DO UPDATE SET full_name = EXCLUDED.full_name, phone = EXCLUDED.phone, \
       avatar_url = EXCLUDED.avatar_url, updated_at = NOW()",
    )
    .bind(profile.user_id)
    .bind(&profile.full_name)
    .bind(&profile.phone)
    .bind(&profile.avatar_url)
    .execute(&self.pool)
    .await
    .map_err(backend)?;
    Ok(())
  }
}
