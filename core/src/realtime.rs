// core/src/realtime.rs

//! In-process change feed for order rows. Writers publish after a successful
//! store call; subscribers treat every notice as "something changed, re-read".

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{event, Level};
use uuid::Uuid;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
  pub order_id: Uuid,
  pub customer_id: Uuid,
  pub status: OrderStatus,
}

impl From<&Order> for ChangeEvent {
  fn from(order: &Order) -> Self {
    Self {
      order_id: order.id,
      customer_id: order.customer_id,
      status: order.status,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
  All,
  Customer(Uuid),
  Order(Uuid),
}

impl FeedFilter {
  fn matches(&self, event: &ChangeEvent) -> bool {
    match self {
      FeedFilter::All => true,
      FeedFilter::Customer(id) => event.customer_id == *id,
      FeedFilter::Order(id) => event.order_id == *id,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Changed(ChangeEvent),
  /// Events were dropped because the subscriber fell behind.
  Resync,
}

pub struct ChangeFeed {
  sender: broadcast::Sender<ChangeEvent>,
  live: Arc<AtomicUsize>,
}

impl ChangeFeed {
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity.max(1));
    Self {
      sender,
      live: Arc::new(AtomicUsize::new(0)),
    }
  }

  pub fn publish(&self, event: ChangeEvent) {
    event!(Level::DEBUG, order_id = %event.order_id, status = %event.status, "Publishing order change.");
    // No subscribers is not an error.
    let _ = self.sender.send(event);
  }

  pub fn subscribe(&self, filter: FeedFilter) -> Subscription {
    self.live.fetch_add(1, Ordering::SeqCst);
    Subscription {
      receiver: self.sender.subscribe(),
      filter,
      live: Arc::clone(&self.live),
    }
  }

  /// Subscriptions not yet dropped.
  pub fn live_subscriptions(&self) -> usize {
    self.live.load(Ordering::SeqCst)
  }
}

impl Default for ChangeFeed {
  fn default() -> Self {
    Self::new(256)
  }
}

/// Dropping the subscription unsubscribes.
pub struct Subscription {
  receiver: broadcast::Receiver<ChangeEvent>,
  filter: FeedFilter,
  live: Arc<AtomicUsize>,
}

impl Subscription {
  /// Waits for the next matching notice. `None` once the feed is gone.
  pub async fn next(&mut self) -> Option<Notice> {
    loop {
      match self.receiver.recv().await {
        Ok(event) if self.filter.matches(&event) => return Some(Notice::Changed(event)),
        Ok(_) => continue,
        Err(RecvError::Lagged(skipped)) => {
          event!(Level::WARN, skipped, "Change feed subscriber lagged.");
          return Some(Notice::Resync);
        }
        Err(RecvError::Closed) => return None,
      }
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.live.fetch_sub(1, Ordering::SeqCst);
    event!(Level::DEBUG, filter = ?self.filter, "Change feed subscription closed.");
  }
}
