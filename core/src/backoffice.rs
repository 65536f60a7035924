// core/src/backoffice.rs

//! Administrator views: the order board and the sales dashboard.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::BrasaResult;
use crate::models::{OrderDetails, OrderStatus, Profile};
use crate::service::BrasaService;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderRow {
  #[serde(flatten)]
  pub details: OrderDetails,
  pub customer: Option<Profile>,
  pub total_quantity: u64,
  pub free_units: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
  pub date: NaiveDate,
  pub revenue_cents: i64,
  pub units_sold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
  pub revenue_today_cents: i64,
  pub units_sold_today: u64,
  pub awaiting_payment: usize,
  pub awaiting_pickup: usize,
  /// Oldest first, ending today.
  pub last_seven_days: Vec<DailySales>,
}

/// Aggregates settled (PAID or DELIVERED) orders by store-local creation date.
pub fn summarize(orders: &[OrderDetails], now: DateTime<Utc>, offset: FixedOffset) -> DashboardSummary {
  let today = now.with_timezone(&offset).date_naive();
  let mut by_day: HashMap<NaiveDate, (i64, u64)> = HashMap::new();
  let mut awaiting_payment = 0;
  let mut awaiting_pickup = 0;

  for details in orders {
    match details.order.status {
      OrderStatus::AwaitingPayment => awaiting_payment += 1,
      OrderStatus::Paid => awaiting_pickup += 1,
      _ => {}
    }
    if !details.order.status.is_settled() {
      continue;
    }
    let day = details.order.created_at.with_timezone(&offset).date_naive();
    let entry = by_day.entry(day).or_default();
    entry.0 += details.order.total_cents;
    entry.1 += details.total_quantity();
  }

  let last_seven_days = (0..7u64)
    .rev()
    .filter_map(|back| today.checked_sub_days(Days::new(back)))
    .map(|date| {
      let (revenue_cents, units_sold) = by_day.get(&date).copied().unwrap_or_default();
      DailySales {
        date,
        revenue_cents,
        units_sold,
      }
    })
    .collect();

  let (revenue_today_cents, units_sold_today) = by_day.get(&today).copied().unwrap_or_default();
  DashboardSummary {
    revenue_today_cents,
    units_sold_today,
    awaiting_payment,
    awaiting_pickup,
    last_seven_days,
  }
}

impl BrasaService {
  /// Every order, newest first, with the buyer's profile.
  pub async fn admin_orders(&self, admin: &Session) -> BrasaResult<Vec<AdminOrderRow>> {
    admin.require_admin()?;
    let orders = self.store.all_orders().await?;

    let mut customer_ids: Vec<_> = orders.iter().map(|d| d.order.customer_id).collect();
    customer_ids.sort_unstable();
    customer_ids.dedup();
    let profiles: HashMap<_, _> = self
      .store
      .profiles(&customer_ids)
      .await?
      .into_iter()
      .map(|p| (p.user_id, p))
      .collect();

    Ok(
      orders
        .into_iter()
        .map(|details| AdminOrderRow {
          customer: profiles.get(&details.order.customer_id).cloned(),
          total_quantity: details.total_quantity(),
          free_units: details.free_units(),
          details,
        })
        .collect(),
    )
  }

  pub async fn dashboard(&self, admin: &Session) -> BrasaResult<DashboardSummary> {
    self.dashboard_at(admin, Utc::now()).await
  }

  pub async fn dashboard_at(&self, admin: &Session, now: DateTime<Utc>) -> BrasaResult<DashboardSummary> {
    admin.require_admin()?;
    let orders = self.store.all_orders().await?;
    Ok(summarize(&orders, now, self.config.utc_offset()))
  }
}
