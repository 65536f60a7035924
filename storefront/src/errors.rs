// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use brasa::BrasaError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error(transparent)]
  Brasa(#[from] BrasaError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable machine-readable code sent alongside the message.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "VALIDATION",
      AppError::Auth(_) => "UNAUTHORIZED",
      AppError::NotFound(_) => "NOT_FOUND",
      AppError::Config(_) => "CONFIGURATION",
      AppError::Internal(_) => "INTERNAL",
      AppError::Brasa(e) => match e {
        BrasaError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        BrasaError::InvalidQuantity => "INVALID_QUANTITY",
        BrasaError::ProductUnavailable => "PRODUCT_UNAVAILABLE",
        BrasaError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
        BrasaError::NoRewardAvailable => "NO_REWARD_AVAILABLE",
        BrasaError::InvalidCode => "INVALID_CODE",
        BrasaError::OrderNotFound(_) => "ORDER_NOT_FOUND",
        BrasaError::PaymentPending(_) => "PAYMENT_PENDING",
        BrasaError::AlreadyDelivered(_) => "ALREADY_DELIVERED",
        BrasaError::InvalidStatus { .. } => "INVALID_STATUS",
        BrasaError::Validation(_) => "VALIDATION",
        BrasaError::Unauthorized => "UNAUTHORIZED",
        BrasaError::Forbidden => "FORBIDDEN",
        BrasaError::ScannerBusy => "SCANNER_BUSY",
        BrasaError::Gateway(_) => "GATEWAY_ERROR",
        BrasaError::Persistence(_) => "PERSISTENCE",
        BrasaError::Workflow(_) => "WORKFLOW",
      },
    }
  }

  fn is_internal(&self) -> bool {
    self.status_code().is_server_error()
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::Brasa(e) => match e {
        BrasaError::InvalidQuantity | BrasaError::InvalidCode | BrasaError::Validation(_) => StatusCode::BAD_REQUEST,
        BrasaError::Unauthorized => StatusCode::UNAUTHORIZED,
        BrasaError::Forbidden => StatusCode::FORBIDDEN,
        BrasaError::ProductNotFound(_) | BrasaError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        BrasaError::InsufficientStock { .. }
        | BrasaError::ProductUnavailable
        | BrasaError::PaymentPending(_)
        | BrasaError::AlreadyDelivered(_)
        | BrasaError::InvalidStatus { .. }
        | BrasaError::ScannerBusy => StatusCode::CONFLICT,
        BrasaError::NoRewardAvailable => StatusCode::UNPROCESSABLE_ENTITY,
        BrasaError::Gateway(_) => StatusCode::BAD_GATEWAY,
        BrasaError::Persistence(_) | BrasaError::Workflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if self.is_internal() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }
    // Internal details stay in the log.
    let message = match self {
      AppError::Config(_) | AppError::Internal(_) => "An internal error occurred".to_string(),
      AppError::Brasa(BrasaError::Persistence(_)) | AppError::Brasa(BrasaError::Workflow(_)) => {
        "An internal error occurred".to_string()
      }
      other => other.to_string(),
    };
    HttpResponse::build(status).json(json!({"error": message, "code": self.code()}))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
