// storefront/src/services/mercadopago.rs

//! PIX charges through the Mercado Pago payments API.

use async_trait::async_trait;
use brasa::{Charge, ChargeRequest, ChargeStatus, GatewayError, PaymentGateway};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Serialize)]
struct Payer<'a> {
  email: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody<'a> {
  transaction_amount: f64,
  description: &'a str,
  payment_method_id: &'static str,
  external_reference: String,
  payer: Payer<'a>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
  qr_code: Option<String>,
  qr_code_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
  transaction_data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
  /// Numeric in practice; kept loose so a string id also parses.
  id: JsonValue,
  #[serde(default)]
  status: Option<String>,
  #[serde(default)]
  point_of_interaction: Option<PointOfInteraction>,
}

pub struct MercadoPagoGateway {
  client: reqwest::Client,
  api_base: String,
  access_token: String,
}

impl MercadoPagoGateway {
  pub fn new(api_base: &str, access_token: &str, timeout: Duration) -> Result<Self, GatewayError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| GatewayError::Transport(format!("Failed to build HTTP client: {e}")))?;
    Ok(Self {
      client,
      api_base: api_base.trim_end_matches('/').to_string(),
      access_token: access_token.to_string(),
    })
  }

  async fn read_json(response: reqwest::Response) -> Result<JsonValue, GatewayError> {
    let status = response.status();
    let body: JsonValue = response
      .json()
      .await
      .map_err(|e| GatewayError::MalformedResponse(format!("Body is not JSON: {e}")))?;
    if !status.is_success() {
      let message = body
        .get("message")
        .and_then(JsonValue::as_str)
        .unwrap_or("Erro no Mercado Pago")
        .to_string();
      return Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
      });
    }
    Ok(body)
  }
}

/// Mercado Pago takes amounts in reais.
fn amount_in_reais(amount_cents: i64) -> f64 {
  amount_cents as f64 / 100.0
}

fn payment_id(raw: &JsonValue) -> Result<String, GatewayError> {
  match raw {
    JsonValue::Number(n) => Ok(n.to_string()),
    JsonValue::String(s) if !s.is_empty() => Ok(s.clone()),
    other => Err(GatewayError::MalformedResponse(format!("Unexpected payment id: {other}"))),
  }
}

fn parse_charge(body: JsonValue) -> Result<Charge, GatewayError> {
  let payment: PaymentResponse =
    serde_json::from_value(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
  let gateway_reference = payment_id(&payment.id)?;
  let data = payment
    .point_of_interaction
    .and_then(|poi| poi.transaction_data)
    .ok_or_else(|| GatewayError::MalformedResponse("Missing point_of_interaction.transaction_data".to_string()))?;
  let copy_paste_code = data
    .qr_code
    .ok_or_else(|| GatewayError::MalformedResponse("Missing PIX copy-paste code".to_string()))?;
  Ok(Charge {
    gateway_reference,
    copy_paste_code,
    qr_code_base64: data.qr_code_base64.unwrap_or_default(),
  })
}

fn parse_status(body: JsonValue) -> Result<ChargeStatus, GatewayError> {
  let payment: PaymentResponse =
    serde_json::from_value(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
  let status = payment
    .status
    .ok_or_else(|| GatewayError::MalformedResponse("Missing payment status".to_string()))?;
  Ok(ChargeStatus::from_gateway(&status))
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
  #[instrument(name = "mercadopago::create_charge", skip(self, request), fields(order_id = %request.order_id, amount_cents = request.amount_cents))]
  async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
    let body = CreatePaymentBody {
      transaction_amount: amount_in_reais(request.amount_cents),
      description: &request.description,
      payment_method_id: "pix",
      external_reference: request.order_id.to_string(),
      payer: Payer {
        email: &request.payer_email,
      },
    };

    let response = self
      .client
      .post(format!("{}/v1/payments", self.api_base))
      .bearer_auth(&self.access_token)
      .header("X-Idempotency-Key", request.idempotency_key())
      .json(&body)
      .send()
      .await
      .map_err(|e| GatewayError::Transport(format!("Payment request failed: {e}")))?;

    let charge = parse_charge(Self::read_json(response).await?)?;
    info!(gateway_reference = %charge.gateway_reference, "PIX charge created.");
    Ok(charge)
  }

  #[instrument(name = "mercadopago::charge_status", skip(self))]
  async fn charge_status(&self, gateway_reference: &str) -> Result<ChargeStatus, GatewayError> {
    let response = self
      .client
      .get(format!("{}/v1/payments/{}", self.api_base, gateway_reference))
      .bearer_auth(&self.access_token)
      .send()
      .await
      .map_err(|e| GatewayError::Transport(format!("Payment lookup failed: {e}")))?;

    let status = parse_status(Self::read_json(response).await?)?;
    if let ChargeStatus::Other(ref raw) = status {
      warn!(raw_status = %raw, "Unrecognised payment status.");
    }
    Ok(status)
  }
}
