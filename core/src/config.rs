// core/src/config.rs

//! Business constants that differ between deployments.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("loyalty unit reward price must be positive, got {0}")]
  NonPositiveUnitPrice(i64),
  #[error("loyalty reward threshold must be positive")]
  ZeroThreshold,
  #[error("store hours must satisfy opens < closes <= 24, got {opens}..{closes}")]
  InvalidHours { opens: u32, closes: u32 },
  #[error("UTC offset of {0} seconds is out of range")]
  InvalidOffset(i32),
}

/// How delivered spend converts into credits and credits into free units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyConfig {
  unit_reward_price_cents: i64,
  reward_threshold: u32,
}

impl LoyaltyConfig {
  pub fn new(unit_reward_price_cents: i64, reward_threshold: u32) -> Result<Self, ConfigError> {
    if unit_reward_price_cents <= 0 {
      return Err(ConfigError::NonPositiveUnitPrice(unit_reward_price_cents));
    }
    if reward_threshold == 0 {
      return Err(ConfigError::ZeroThreshold);
    }
    Ok(Self {
      unit_reward_price_cents,
      reward_threshold,
    })
  }

  /// Delivered spend, in cents, that earns one credit.
  pub fn unit_reward_price_cents(&self) -> i64 {
    self.unit_reward_price_cents
  }

  /// Credits consumed by one free unit.
  pub fn reward_threshold(&self) -> u32 {
    self.reward_threshold
  }
}

impl Default for LoyaltyConfig {
  fn default() -> Self {
    Self {
      unit_reward_price_cents: 1000,
      reward_threshold: 10,
    }
  }
}

/// Opening window in store-local hours, `[opens_at, closes_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHours {
  opens_at: u32,
  closes_at: u32,
}

impl StoreHours {
  pub fn new(opens_at: u32, closes_at: u32) -> Result<Self, ConfigError> {
    if opens_at >= closes_at || closes_at > 24 {
      return Err(ConfigError::InvalidHours {
        opens: opens_at,
        closes: closes_at,
      });
    }
    Ok(Self { opens_at, closes_at })
  }

  pub fn opens_at(&self) -> u32 {
    self.opens_at
  }

  pub fn closes_at(&self) -> u32 {
    self.closes_at
  }

  pub fn is_open_at_hour(&self, hour: u32) -> bool {
    hour >= self.opens_at && hour < self.closes_at
  }
}

impl Default for StoreHours {
  fn default() -> Self {
    Self { opens_at: 7, closes_at: 22 }
  }
}

#[derive(Debug, Clone)]
pub struct BrasaConfig {
  pub loyalty: LoyaltyConfig,
  pub hours: StoreHours,
  utc_offset_secs: i32,
  /// How long the scanner shows an outcome before returning to ready.
  pub scanner_reset_after: Duration,
  /// Prefix of ticket URLs; the order id is appended as the last path segment.
  pub ticket_base_url: String,
  /// Sent to the payment gateway as the charge description.
  pub payment_description: String,
  /// Upper bound on opening a PIX charge; past it the checkout is rolled back.
  pub charge_timeout: Duration,
}

impl BrasaConfig {
  pub fn with_utc_offset_secs(mut self, secs: i32) -> Result<Self, ConfigError> {
    FixedOffset::east_opt(secs).ok_or(ConfigError::InvalidOffset(secs))?;
    self.utc_offset_secs = secs;
    Ok(self)
  }

  pub fn utc_offset(&self) -> FixedOffset {
    FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
  }

  pub fn local_time(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.with_timezone(&self.utc_offset())
  }

  pub fn is_open(&self, at: DateTime<Utc>) -> bool {
    self.hours.is_open_at_hour(self.local_time(at).hour())
  }

  pub fn ticket_url(&self, order_id: uuid::Uuid) -> String {
    format!("{}/pedido/{}", self.ticket_base_url.trim_end_matches('/'), order_id)
  }
}

impl Default for BrasaConfig {
  fn default() -> Self {
    Self {
      loyalty: LoyaltyConfig::default(),
      hours: StoreHours::default(),
      utc_offset_secs: -3 * 3600,
      scanner_reset_after: Duration::from_secs(4),
      ticket_base_url: "http://localhost:8080".to_string(),
      payment_description: "Saco de carvão".to_string(),
      charge_timeout: Duration::from_secs(30),
    }
  }
}
