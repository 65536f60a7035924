// core/src/loyalty.rs

//! Credit accounting. Nothing is stored: the balance is recomputed from the
//! customer's order history every time it is needed.

use serde::Serialize;

use crate::config::LoyaltyConfig;
use crate::models::{OrderDetails, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoyaltyLedger {
  /// Sum of totals of DELIVERED orders.
  pub delivered_spend_cents: i64,
  /// `floor(delivered_spend / unit_reward_price)`
  pub earned_credits: i64,
  /// Zero-priced units across all of the customer's orders.
  pub redeemed_free_units: u64,
  /// `earned - redeemed * threshold`. May be negative; treat that as zero.
  pub available_credits: i64,
  pub redeemable_rewards: u64,
  /// Credits collected towards the next free unit.
  pub progress_within_cycle: u64,
  pub progress_percent: u8,
  pub reward_threshold: u32,
}

impl LoyaltyLedger {
  /// Builds the ledger from every order the customer owns.
  pub fn from_history<'a, I>(orders: I, config: &LoyaltyConfig) -> Self
  where
    I: IntoIterator<Item = &'a OrderDetails>,
  {
    let (delivered_spend_cents, redeemed_free_units) =
      orders.into_iter().fold((0i64, 0u64), |(spend, free), details| {
        let spend = if details.order.status == OrderStatus::Delivered {
          spend + details.order.total_cents
        } else {
          spend
        };
        (spend, free + details.free_units())
      });
    Self::from_totals(delivered_spend_cents, redeemed_free_units, config)
  }

  pub fn from_totals(delivered_spend_cents: i64, redeemed_free_units: u64, config: &LoyaltyConfig) -> Self {
    let threshold = config.reward_threshold();
    let earned_credits = delivered_spend_cents.max(0) / config.unit_reward_price_cents();
    let spent = i64::try_from(redeemed_free_units)
      .unwrap_or(i64::MAX)
      .saturating_mul(i64::from(threshold));
    let available_credits = earned_credits.saturating_sub(spent);

    let usable = u64::try_from(available_credits).unwrap_or(0);
    let redeemable_rewards = usable / u64::from(threshold);
    let progress_within_cycle = usable % u64::from(threshold);
    let progress_percent = (progress_within_cycle * 100 / u64::from(threshold)) as u8;

    Self {
      delivered_spend_cents,
      earned_credits,
      redeemed_free_units,
      available_credits,
      redeemable_rewards,
      progress_within_cycle,
      progress_percent,
      reward_threshold: threshold,
    }
  }

  pub fn can_redeem(&self) -> bool {
    self.redeemable_rewards >= 1
  }
}
