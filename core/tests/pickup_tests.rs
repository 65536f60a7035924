// tests/pickup_tests.rs
mod common;

use brasa::models::OrderStatus;
use brasa::{BrasaError, CheckoutRequest, Store};
use common::*;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn paid_order_is_handed_over_once() {
  let fx = Fixture::new().await;
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(3, BAG_PRICE)]).await;

  let receipt = fx.service.redeem_pickup(&fx.admin, &id.to_string()).await.unwrap();

  assert_eq!(receipt.order_id, id);
  assert_eq!(receipt.quantity_handed_over, 3);
  assert_eq!(receipt.free_units_included, 0);
  let stored = fx.store.order(id).await.unwrap().unwrap();
  assert_eq!(stored.order.status, OrderStatus::Delivered);
  assert_eq!(stored.order.delivered_at, Some(receipt.delivered_at));

  let again = fx.service.redeem_pickup(&fx.admin, &id.to_string()).await.unwrap_err();
  assert!(matches!(again, BrasaError::AlreadyDelivered(got) if got == id));
}

#[tokio::test]
async fn ticket_url_is_accepted_as_scan_code() {
  let fx = Fixture::new().await;
  let id = fx
    .seed_order(fx.customer.user_id, OrderStatus::Paid, &[(1, BAG_PRICE), (1, 0)])
    .await;
  let url = fx.service.config().ticket_url(id);

  let receipt = fx.service.redeem_pickup(&fx.admin, &url).await.unwrap();

  assert_eq!(receipt.quantity_handed_over, 2);
  assert_eq!(receipt.free_units_included, 1);
}

#[tokio::test]
async fn unpaid_order_is_refused() {
  let fx = Fixture::new().await;
  let placed = fx
    .service
    .place_order(
      &fx.customer,
      CheckoutRequest {
        quantity: 1,
        redeem_reward: false,
      },
    )
    .await
    .unwrap();

  let err = fx
    .service
    .redeem_pickup(&fx.admin, &placed.ticket_url)
    .await
    .unwrap_err();

  assert!(matches!(err, BrasaError::PaymentPending(_)));
  assert_eq!(fx.status_of(placed.order.id).await, OrderStatus::AwaitingPayment);
}

#[tokio::test]
async fn cancelled_order_reports_its_status() {
  let fx = Fixture::new().await;
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Cancelled, &[(1, BAG_PRICE)]).await;

  let err = fx.service.redeem_pickup(&fx.admin, &id.to_string()).await.unwrap_err();

  assert!(matches!(
    err,
    BrasaError::InvalidStatus {
      status: OrderStatus::Cancelled,
      ..
    }
  ));
}

#[tokio::test]
async fn unknown_and_malformed_codes() {
  let fx = Fixture::new().await;

  let missing = Uuid::new_v4();
  let err = fx.service.redeem_pickup(&fx.admin, &missing.to_string()).await.unwrap_err();
  assert!(matches!(err, BrasaError::OrderNotFound(got) if got == missing));

  let err = fx.service.redeem_pickup(&fx.admin, "hello world").await.unwrap_err();
  assert!(matches!(err, BrasaError::InvalidCode));
}

#[tokio::test]
async fn customers_cannot_operate_the_window() {
  let fx = Fixture::new().await;
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(1, BAG_PRICE)]).await;

  let err = fx.service.redeem_pickup(&fx.customer, &id.to_string()).await.unwrap_err();

  assert!(matches!(err, BrasaError::Forbidden));
  assert_eq!(fx.status_of(id).await, OrderStatus::Paid);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_scans_deliver_exactly_once() {
  let fx = Arc::new(Fixture::new().await);
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(2, BAG_PRICE)]).await;

  let mut handles = Vec::new();
  for _ in 0..6 {
    let guard = fx.service.pickup_guard();
    let code = id.to_string();
    handles.push(tokio::spawn(async move { guard.redeem(&code).await }));
  }

  let mut delivered = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => delivered += 1,
      Err(BrasaError::AlreadyDelivered(_)) => {}
      Err(other) => panic!("unexpected error: {other}"),
    }
  }
  assert_eq!(delivered, 1);
  assert_eq!(fx.status_of(id).await, OrderStatus::Delivered);
}

#[tokio::test]
async fn delivered_status_is_terminal_for_approval() {
  let fx = Fixture::new().await;
  let id = fx.seed_order(fx.customer.user_id, OrderStatus::Paid, &[(1, BAG_PRICE)]).await;
  fx.service.redeem_pickup(&fx.admin, &id.to_string()).await.unwrap();

  let err = fx.service.approve_payment(&fx.admin, id).await.unwrap_err();

  assert!(matches!(
    err,
    BrasaError::InvalidStatus {
      status: OrderStatus::Delivered,
      ..
    }
  ));
  assert_eq!(fx.status_of(id).await, OrderStatus::Delivered);
}
