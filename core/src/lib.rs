// src/lib.rs

//! Brasa: order, loyalty and pickup core for a drive-thru charcoal storefront.
//!
//! A customer buys bags of the single active product, pays by PIX, and picks
//! the order up by showing a ticket whose QR code the attendant scans. Every
//! delivered purchase earns loyalty credits that can be traded for a free bag.
//!
//!  - [`checkout`] places orders as a compensating [`workflow`].
//!  - [`payment`] confirms payment, manually or from the gateway.
//!  - [`pickup`] and [`scanner`] hand orders over exactly once.
//!  - [`loyalty`] derives credit balances from order history.
//!  - [`realtime`] fans order changes out to live views.
//!
//! Storage, the payment gateway and file storage are ports ([`store::Store`],
//! [`gateway::PaymentGateway`], [`storage::FileStorage`]) with an in-memory
//! store bundled for tests and local runs.

pub mod account;
pub mod backoffice;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gateway;
pub mod loyalty;
pub mod models;
pub mod payment;
pub mod pickup;
pub mod profile;
pub mod realtime;
pub mod scanner;
pub mod service;
pub mod session;
pub mod storage;
pub mod store;
pub mod workflow;

pub use crate::account::{AccountView, AccountWatch, CustomerOrder};
pub use crate::backoffice::{AdminOrderRow, DailySales, DashboardSummary};
pub use crate::catalog::StorefrontView;
pub use crate::checkout::{price_order, CheckoutRequest, PlacedOrder, Pricing};
pub use crate::config::{BrasaConfig, ConfigError, LoyaltyConfig, StoreHours};
pub use crate::error::{BrasaError, BrasaResult};
pub use crate::gateway::{Charge, ChargeRequest, ChargeStatus, GatewayError, PaymentGateway};
pub use crate::loyalty::LoyaltyLedger;
pub use crate::pickup::{extract_order_id, PickupGuard, PickupReceipt};
pub use crate::profile::{format_phone, ProfileUpdate};
pub use crate::realtime::{ChangeEvent, ChangeFeed, FeedFilter, Notice, Subscription};
pub use crate::scanner::{ScannerState, ScannerStation};
pub use crate::service::BrasaService;
pub use crate::session::{Role, Session};
pub use crate::storage::FileStorage;
pub use crate::store::{MemoryStore, Store, StoreError, StoreResult};
pub use crate::workflow::{Flow, FlowOutcome, Shared, Workflow, WorkflowError, WorkflowRegistry};
