// tests/backoffice_tests.rs
mod common;

use brasa::models::{OrderStatus, Profile, ProductDraft};
use brasa::{BrasaError, ProfileUpdate, Store};
use chrono::{Duration, TimeZone, Utc};
use common::*;
use uuid::Uuid;

#[tokio::test]
async fn dashboard_counts_settled_orders_by_local_day() {
  let fx = Fixture::new().await;
  let me = fx.customer.user_id;
  // 15:00 UTC is 12:00 at the store.
  let now = Utc.with_ymd_and_hms(2026, 5, 20, 15, 0, 0).unwrap();

  fx.seed_order_at(me, OrderStatus::Paid, &[(2, BAG_PRICE)], now - Duration::hours(1)).await;
  fx.seed_order_at(me, OrderStatus::Delivered, &[(1, BAG_PRICE), (1, 0)], now - Duration::hours(2)).await;
  fx.seed_order_at(me, OrderStatus::AwaitingPayment, &[(9, BAG_PRICE)], now).await;
  // 01:00 UTC on the 20th is still the 19th locally.
  fx.seed_order_at(
    me,
    OrderStatus::Delivered,
    &[(4, BAG_PRICE)],
    Utc.with_ymd_and_hms(2026, 5, 20, 1, 0, 0).unwrap(),
  )
  .await;
  fx.seed_order_at(me, OrderStatus::Delivered, &[(7, BAG_PRICE)], now - Duration::days(10)).await;

  let summary = fx.service.dashboard_at(&fx.admin, now).await.unwrap();

  assert_eq!(summary.revenue_today_cents, 3 * BAG_PRICE);
  assert_eq!(summary.units_sold_today, 4);
  assert_eq!(summary.awaiting_payment, 1);
  assert_eq!(summary.awaiting_pickup, 1);

  assert_eq!(summary.last_seven_days.len(), 7);
  let today = summary.last_seven_days.last().unwrap();
  assert_eq!(today.date, chrono::NaiveDate::from_ymd_opt(2026, 5, 20).unwrap());
  let yesterday = &summary.last_seven_days[5];
  assert_eq!(yesterday.revenue_cents, 4 * BAG_PRICE);
  assert_eq!(summary.last_seven_days[0].date, chrono::NaiveDate::from_ymd_opt(2026, 5, 14).unwrap());
  let week_total: i64 = summary.last_seven_days.iter().map(|d| d.revenue_cents).sum();
  assert_eq!(week_total, 7 * BAG_PRICE);
}

#[tokio::test]
async fn dashboard_is_admin_only() {
  let fx = Fixture::new().await;

  assert!(matches!(
    fx.service.dashboard(&fx.customer).await,
    Err(BrasaError::Forbidden)
  ));
}

#[tokio::test]
async fn order_board_joins_customer_profiles() {
  let fx = Fixture::new().await;
  fx.service
    .update_profile(
      &fx.customer,
      ProfileUpdate {
        full_name: Some("  Joana Silva ".to_string()),
        phone: Some("11987654321".to_string()),
      },
    )
    .await
    .unwrap();
  fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(2, BAG_PRICE), (1, 0)]).await;
  fx.seed_order(Uuid::new_v4(), OrderStatus::AwaitingPayment, &[(1, BAG_PRICE)]).await;

  let rows = fx.service.admin_orders(&fx.admin).await.unwrap();

  assert_eq!(rows.len(), 2);
  let mine = rows
    .iter()
    .find(|r| r.details.order.customer_id == fx.customer.user_id)
    .unwrap();
  let profile = mine.customer.as_ref().unwrap();
  assert_eq!(profile.full_name.as_deref(), Some("Joana Silva"));
  assert_eq!(profile.phone.as_deref(), Some("(11) 98765-4321"));
  assert_eq!(mine.total_quantity, 3);
  assert_eq!(mine.free_units, 1);
  assert!(rows.iter().any(|r| r.customer.is_none()));
}

#[tokio::test]
async fn product_crud_validates_and_drives_storefront() {
  let fx = Fixture::new().await;
  let draft = |name: &str, price_cents: i64| ProductDraft {
    name: name.to_string(),
    price_cents,
    stock: 40,
    active: true,
  };

  assert!(matches!(
    fx.service.create_product(&fx.admin, draft(" ", 1000)).await,
    Err(BrasaError::Validation(_))
  ));
  assert!(matches!(
    fx.service.create_product(&fx.admin, draft("Carvão 3kg", 0)).await,
    Err(BrasaError::Validation(_))
  ));
  assert!(matches!(
    fx.service.create_product(&fx.customer, draft("Carvão 3kg", 700)).await,
    Err(BrasaError::Forbidden)
  ));

  let created = fx.service.create_product(&fx.admin, draft("Carvão 3kg", 700)).await.unwrap();
  assert_eq!(fx.service.list_products(&fx.admin).await.unwrap().len(), 2);

  // The alphabetically first active product is the one on sale.
  let front = fx.service.storefront(None).await.unwrap();
  assert_eq!(front.product.map(|p| p.id), Some(created.id));
  assert!(front.loyalty.is_none());

  let mut retire = draft("Carvão 3kg", 700);
  retire.active = false;
  fx.service.update_product(&fx.admin, created.id, retire).await.unwrap();
  let front = fx.service.storefront(Some(&fx.customer)).await.unwrap();
  assert_eq!(front.product.map(|p| p.id), Some(fx.product.id));
  assert!(front.loyalty.is_some());

  fx.service.delete_product(&fx.admin, created.id).await.unwrap();
  assert!(matches!(
    fx.service.delete_product(&fx.admin, created.id).await,
    Err(BrasaError::ProductNotFound(_))
  ));
}

#[tokio::test]
async fn storefront_reports_opening_hours() {
  let fx = Fixture::new().await;
  let night = Utc.with_ymd_and_hms(2026, 5, 20, 3, 0, 0).unwrap();
  let noon = Utc.with_ymd_and_hms(2026, 5, 20, 15, 0, 0).unwrap();

  assert!(!fx.service.storefront_at(None, night).await.unwrap().is_open);
  assert!(fx.service.storefront_at(None, noon).await.unwrap().is_open);
}

#[tokio::test]
async fn avatar_upload_stores_file_and_updates_profile() {
  let fx = Fixture::new().await;

  let profile: Profile = fx
    .service
    .upload_avatar(&fx.customer, "selfie.JPG", b"\xff\xd8\xff")
    .await
    .unwrap();

  let url = profile.avatar_url.unwrap();
  assert!(url.starts_with(&format!("https://files.test/avatars/{}-", fx.customer.user_id)));
  assert!(url.ends_with(".jpg"));
  assert_eq!(fx.files.files.lock().len(), 1);
  assert_eq!(
    fx.store.profile(fx.customer.user_id).await.unwrap().unwrap().avatar_url.as_deref(),
    Some(url.as_str())
  );

  assert!(matches!(
    fx.service.upload_avatar(&fx.customer, "empty.png", b"").await,
    Err(BrasaError::Validation(_))
  ));
}
