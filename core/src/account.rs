// core/src/account.rs

//! The customer's own view: order history, tickets and credit balance.

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{BrasaError, BrasaResult};
use crate::loyalty::LoyaltyLedger;
use crate::models::{format_brl, OrderDetails, Profile};
use crate::realtime::{FeedFilter, Subscription};
use crate::service::BrasaService;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct CustomerOrder {
  #[serde(flatten)]
  pub details: OrderDetails,
  pub ticket_url: String,
  pub total_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
  pub profile: Profile,
  pub orders: Vec<CustomerOrder>,
  pub loyalty: LoyaltyLedger,
}

impl BrasaService {
  fn customer_order(&self, details: OrderDetails) -> CustomerOrder {
    CustomerOrder {
      ticket_url: self.config.ticket_url(details.order.id),
      total_display: format_brl(details.order.total_cents),
      details,
    }
  }

  pub async fn loyalty(&self, customer: &Session) -> BrasaResult<LoyaltyLedger> {
    let history = self.store.orders_for_customer(customer.user_id).await?;
    Ok(LoyaltyLedger::from_history(&history, &self.config.loyalty))
  }

  #[instrument(name = "BrasaService::account", skip_all, fields(customer_id = %customer.user_id), err(Display))]
  pub async fn account(&self, customer: &Session) -> BrasaResult<AccountView> {
    let history = self.store.orders_for_customer(customer.user_id).await?;
    let loyalty = LoyaltyLedger::from_history(&history, &self.config.loyalty);
    let profile = self.profile(customer).await?;
    Ok(AccountView {
      profile,
      orders: history.into_iter().map(|d| self.customer_order(d)).collect(),
      loyalty,
    })
  }

  /// A single order ticket. Customers only see their own orders.
  pub async fn ticket(&self, viewer: &Session, order_id: Uuid) -> BrasaResult<CustomerOrder> {
    let details = self
      .store
      .order(order_id)
      .await?
      .filter(|d| viewer.is_admin() || d.order.customer_id == viewer.user_id)
      .ok_or(BrasaError::OrderNotFound(order_id))?;
    Ok(self.customer_order(details))
  }

  /// Live account view: yields a fresh [`AccountView`] every time one of the
  /// customer's orders changes.
  pub fn watch_account(&self, customer: &Session) -> AccountWatch {
    AccountWatch {
      service: self.clone(),
      customer: customer.clone(),
      subscription: self.feed.subscribe(FeedFilter::Customer(customer.user_id)),
    }
  }
}

/// Dropping the watch tears down its feed subscription.
pub struct AccountWatch {
  service: BrasaService,
  customer: Session,
  subscription: Subscription,
}

impl AccountWatch {
  /// Waits for a change and re-reads the account. Duplicate or coalesced
  /// notices just cause another read. `None` when the feed shuts down.
  pub async fn next(&mut self) -> Option<BrasaResult<AccountView>> {
    self.subscription.next().await?;
    Some(self.service.account(&self.customer).await)
  }
}
