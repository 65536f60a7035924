// tests/scanner_tests.rs
mod common;

use brasa::models::OrderStatus;
use brasa::{PickupGuard, ScannerState, ScannerStation};
use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn station(fx: &Fixture) -> ScannerStation {
  ScannerStation::new(fx.service.pickup_guard(), Duration::from_secs(4))
}

#[tokio::test(start_paused = true)]
async fn outcome_stays_on_screen_then_resets() {
  let fx = Fixture::new().await;
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(2, BAG_PRICE)]).await;
  let station = station(&fx);

  let shown = station.scan(&id.to_string()).await.unwrap();
  assert!(matches!(shown, ScannerState::Delivered { ref receipt } if receipt.quantity_handed_over == 2));

  tokio::time::sleep(Duration::from_millis(3900)).await;
  assert_eq!(station.state(), shown);

  tokio::time::sleep(Duration::from_millis(200)).await;
  assert_eq!(station.state(), ScannerState::Ready);
}

#[tokio::test(start_paused = true)]
async fn rejection_is_shown_and_reset_too() {
  let fx = Fixture::new().await;
  let id = fx
    .seed_order(fx.customer.user_id, OrderStatus::AwaitingPayment, &[(1, BAG_PRICE)])
    .await;
  let station = station(&fx);

  let shown = station.scan(&id.to_string()).await.unwrap();
  assert!(matches!(shown, ScannerState::Rejected { ref message } if message.contains("pending")));

  tokio::time::sleep(Duration::from_millis(4100)).await;
  assert_eq!(station.state(), ScannerState::Ready);
}

#[tokio::test(start_paused = true)]
async fn manual_restart_cancels_the_old_timer() {
  let fx = Fixture::new().await;
  let first = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(1, BAG_PRICE)]).await;
  let second = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(1, BAG_PRICE)]).await;
  let station = station(&fx);

  station.scan(&first.to_string()).await.unwrap();
  tokio::time::sleep(Duration::from_secs(2)).await;
  assert_eq!(station.reset_now(), ScannerState::Ready);
  let shown = station.scan(&second.to_string()).await.unwrap();

  // The first scan's timer would have fired here.
  tokio::time::sleep(Duration::from_millis(2500)).await;
  assert_eq!(station.state(), shown);

  tokio::time::sleep(Duration::from_secs(2)).await;
  assert_eq!(station.state(), ScannerState::Ready);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_station_is_clean() {
  let fx = Fixture::new().await;
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(1, BAG_PRICE)]).await;
  let station = station(&fx);
  station.scan(&id.to_string()).await.unwrap();

  drop(station);
  tokio::time::sleep(Duration::from_secs(5)).await;

  assert_eq!(fx.status_of(id).await, OrderStatus::Delivered);
}

#[tokio::test(start_paused = true)]
async fn abandoned_scan_frees_the_station() {
  let fx = Fixture::new().await;
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(1, BAG_PRICE)]).await;
  let store = Arc::new(StallingStore::new(fx.store.clone()));
  let station = ScannerStation::new(
    PickupGuard::new(store.clone(), fx.service.feed().clone()),
    Duration::from_secs(4),
  );

  let code = id.to_string();
  let abandoned = tokio::time::timeout(Duration::from_millis(20), station.scan(&code)).await;
  assert!(abandoned.is_err());
  assert_eq!(station.state(), ScannerState::Ready);
  assert_eq!(fx.status_of(id).await, OrderStatus::Paid);

  store.stall_lookups.store(false, Ordering::SeqCst);
  let shown = station.scan(&code).await.unwrap();
  assert!(matches!(shown, ScannerState::Delivered { .. }));
}
