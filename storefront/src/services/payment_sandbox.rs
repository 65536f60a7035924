// storefront/src/services/payment_sandbox.rs

//! Local stand-in for the payment gateway, used when no Mercado Pago token is
//! configured. Charges get a fake PIX code; any charge it issued reports
//! `approved` on lookup, so posting a webhook notification for it simulates
//! the customer paying.

use async_trait::async_trait;
use brasa::{Charge, ChargeRequest, ChargeStatus, GatewayError, PaymentGateway};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Default)]
pub struct SandboxGateway {
  /// Idempotency key -> charge already issued for it.
  issued: Mutex<HashMap<String, Charge>>,
  latency: Duration,
}

impl SandboxGateway {
  pub fn new(latency: Duration) -> Self {
    Self {
      issued: Mutex::new(HashMap::new()),
      latency,
    }
  }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
  #[instrument(name = "sandbox::create_charge", skip(self, request), fields(order_id = %request.order_id, amount_cents = request.amount_cents))]
  async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
    if request.amount_cents <= 0 {
      return Err(GatewayError::Rejected {
        status: 400,
        message: "transaction_amount must be positive".to_string(),
      });
    }
    tokio::time::sleep(self.latency).await; // Simulate network latency

    let key = request.idempotency_key();
    let charge = self
      .issued
      .lock()
      .entry(key)
      .or_insert_with(|| {
        let reference = format!("sandbox_pix_{}", Uuid::new_v4().simple());
        Charge {
          copy_paste_code: format!("00020126580014br.gov.bcb.pix0136{}5204000053039865802BR", reference),
          qr_code_base64: String::new(),
          gateway_reference: reference,
        }
      })
      .clone();
    info!(gateway_reference = %charge.gateway_reference, "Sandbox PIX charge issued.");
    Ok(charge)
  }

  async fn charge_status(&self, gateway_reference: &str) -> Result<ChargeStatus, GatewayError> {
    let known = self
      .issued
      .lock()
      .values()
      .any(|c| c.gateway_reference == gateway_reference);
    if known {
      Ok(ChargeStatus::Approved)
    } else {
      Err(GatewayError::Rejected {
        status: 404,
        message: format!("Payment {} not found", gateway_reference),
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(order_id: Uuid, amount_cents: i64) -> ChargeRequest {
    ChargeRequest {
      order_id,
      amount_cents,
      payer_email: "cliente@brasa.test".to_string(),
      description: "Saco de carvão".to_string(),
    }
  }

  #[tokio::test]
  async fn replaying_an_order_returns_the_same_charge() {
    let gateway = SandboxGateway::default();
    let order_id = Uuid::new_v4();
    let first = gateway.create_charge(&request(order_id, 2000)).await.unwrap();
    let second = gateway.create_charge(&request(order_id, 2000)).await.unwrap();
    assert_eq!(first, second);
    assert!(first.copy_paste_code.contains(&first.gateway_reference));
  }

  #[tokio::test]
  async fn issued_charges_report_approved() {
    let gateway = SandboxGateway::default();
    let charge = gateway.create_charge(&request(Uuid::new_v4(), 1000)).await.unwrap();
    assert_eq!(
      gateway.charge_status(&charge.gateway_reference).await.unwrap(),
      ChargeStatus::Approved
    );
    assert!(gateway.charge_status("unknown").await.is_err());
    assert!(gateway.create_charge(&request(Uuid::new_v4(), 0)).await.is_err());
  }
}
