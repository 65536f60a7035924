// storefront/src/web/handlers/mod.rs

pub mod account_handlers;
pub mod admin_handlers;
pub mod checkout_handlers;
pub mod extractors;
pub mod profile_handlers;
pub mod scanner_handlers;
pub mod storefront_handlers;
pub mod webhook_handlers;
