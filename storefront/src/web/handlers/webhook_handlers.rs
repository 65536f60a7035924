// storefront/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpResponse};
use brasa::{FlowOutcome, Shared};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::errors::AppError;
use crate::pipelines::webhook_pipeline::WebhookCtxData;
use crate::state::AppState;

/// Mercado Pago payment notifications. Anything the workflow accepts, including
/// irrelevant actions, is acknowledged with 200 so the provider stops retrying.
#[instrument(name = "handler::payment_webhook", skip(app_state, body), fields(size = body.len()))]
pub async fn payment_webhook_handler(
  app_state: web::Data<AppState>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let ctx = Shared::new(WebhookCtxData::new(app_state.brasa.clone(), body));

  match app_state.brasa.workflows().run(ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let confirmed = ctx.read().confirmed_order.as_ref().map(|o| o.id);
      info!(confirmed_order = ?confirmed, "Payment webhook processed.");
      Ok(HttpResponse::Ok().json(json!({ "received": true, "confirmedOrder": confirmed })))
    }
    Ok(FlowOutcome::Stopped) => {
      info!("Payment webhook ignored: not a payment change.");
      Ok(HttpResponse::Ok().json(json!({ "received": true })))
    }
    Err(brasa_err) => {
      error!(error = %brasa_err, "Payment webhook failed.");
      Err(brasa_err.into())
    }
  }
}
