// core/src/error.rs
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::models::OrderStatus;
use crate::store::StoreError;
use crate::workflow::WorkflowError;

/// Every failure a storefront operation can surface to its caller.
#[derive(Debug, Error)]
pub enum BrasaError {
  #[error("Requested {requested} unit(s) but not enough stock is available")]
  InsufficientStock { requested: u32 },

  #[error("Quantity must be at least 1")]
  InvalidQuantity,

  #[error("No product is currently on sale")]
  ProductUnavailable,

  #[error("Product {0} not found")]
  ProductNotFound(Uuid),

  #[error("Not enough loyalty credits to redeem a free unit")]
  NoRewardAvailable,

  #[error("Scanned code does not identify an order")]
  InvalidCode,

  #[error("Order {0} not found")]
  OrderNotFound(Uuid),

  #[error("Payment for order {0} is still pending")]
  PaymentPending(Uuid),

  #[error("Order {0} was already handed over")]
  AlreadyDelivered(Uuid),

  #[error("Order {order_id} is {status} and cannot move on")]
  InvalidStatus { order_id: Uuid, status: OrderStatus },

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Sign-in required")]
  Unauthorized,

  #[error("Administrator role required")]
  Forbidden,

  #[error("Scanner is still processing the previous code")]
  ScannerBusy,

  #[error("Payment gateway error: {0}")]
  Gateway(#[from] GatewayError),

  #[error("Persistence error: {0}")]
  Persistence(#[from] StoreError),

  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}

pub type BrasaResult<T> = Result<T, BrasaError>;
