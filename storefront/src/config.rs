// storefront/src/config.rs

use crate::errors::{AppError, Result};
use brasa::{BrasaConfig, LoyaltyConfig, StoreHours};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Absent means the in-memory store is used.
  pub database_url: Option<String>,
  pub app_base_url: String,

  pub jwt_secret: String,

  /// Absent means charges go to the local sandbox gateway.
  pub mercadopago_access_token: Option<String>,
  pub mercadopago_api_base: String,
  pub gateway_timeout: Duration,
  pub payment_description: String,

  pub avatar_dir: String,
  pub avatar_public_base_url: String,

  pub loyalty_unit_price_cents: i64,
  pub loyalty_reward_threshold: u32,
  pub scanner_reset_after: Duration,
  pub store_opens_at: u32,
  pub store_closes_at: u32,
  pub store_utc_offset_hours: i32,

  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Builds the configuration from any key lookup. `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let or_default = |var_name: &str, default: &str| get_env(var_name).unwrap_or_else(|_| default.to_string());

    let server_host = or_default("SERVER_HOST", "127.0.0.1");
    let server_port = parse_num::<u16>("SERVER_PORT", &or_default("SERVER_PORT", "8080"))?;
    let database_url = get_env("DATABASE_URL").ok();
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

    let jwt_secret = get_env("JWT_SECRET")?;

    let mercadopago_access_token = get_env("MERCADOPAGO_ACCESS_TOKEN").ok();
    let mercadopago_api_base = or_default("MERCADOPAGO_API_BASE", "https://api.mercadopago.com");
    let gateway_timeout = Duration::from_secs(parse_num("GATEWAY_TIMEOUT_SECS", &or_default("GATEWAY_TIMEOUT_SECS", "15"))?);
    let payment_description = or_default("PAYMENT_DESCRIPTION", "Carvão Premium - BrasaExpress");

    let avatar_dir = or_default("AVATAR_DIR", "./avatars");
    let avatar_public_base_url =
      get_env("AVATAR_PUBLIC_BASE_URL").unwrap_or_else(|_| format!("{}/avatars", app_base_url.trim_end_matches('/')));

    let loyalty_unit_price_cents = parse_num("LOYALTY_UNIT_PRICE_CENTS", &or_default("LOYALTY_UNIT_PRICE_CENTS", "1000"))?;
    let loyalty_reward_threshold = parse_num("LOYALTY_REWARD_THRESHOLD", &or_default("LOYALTY_REWARD_THRESHOLD", "10"))?;
    let scanner_reset_after = Duration::from_secs(parse_num("SCANNER_RESET_SECS", &or_default("SCANNER_RESET_SECS", "4"))?);
    let store_opens_at = parse_num("STORE_OPENS_AT", &or_default("STORE_OPENS_AT", "7"))?;
    let store_closes_at = parse_num("STORE_CLOSES_AT", &or_default("STORE_CLOSES_AT", "22"))?;
    let store_utc_offset_hours = parse_num("STORE_UTC_OFFSET_HOURS", &or_default("STORE_UTC_OFFSET_HOURS", "-3"))?;

    let log_format = match or_default("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
      "json" => LogFormat::Json,
      "pretty" | "text" => LogFormat::Pretty,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    let config = Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      jwt_secret,
      mercadopago_access_token,
      mercadopago_api_base,
      gateway_timeout,
      payment_description,
      avatar_dir,
      avatar_public_base_url,
      loyalty_unit_price_cents,
      loyalty_reward_threshold,
      scanner_reset_after,
      store_opens_at,
      store_closes_at,
      store_utc_offset_hours,
      log_format,
    };
    // Validate the business half now so a bad value fails at startup.
    config.brasa_config()?;
    Ok(config)
  }

  /// Business settings handed to the core service.
  pub fn brasa_config(&self) -> Result<BrasaConfig> {
    let loyalty = LoyaltyConfig::new(self.loyalty_unit_price_cents, self.loyalty_reward_threshold)
      .map_err(|e| AppError::Config(e.to_string()))?;
    let hours = StoreHours::new(self.store_opens_at, self.store_closes_at).map_err(|e| AppError::Config(e.to_string()))?;

    let mut config = BrasaConfig::default();
    config.loyalty = loyalty;
    config.hours = hours;
    config.scanner_reset_after = self.scanner_reset_after;
    config.ticket_base_url = self.app_base_url.clone();
    config.payment_description = self.payment_description.clone();
    config.charge_timeout = self.gateway_timeout;
    config
      .with_utc_offset_secs(self.store_utc_offset_hours.saturating_mul(3600))
      .map_err(|e| AppError::Config(e.to_string()))
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_num<T>(var_name: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e)))
}
