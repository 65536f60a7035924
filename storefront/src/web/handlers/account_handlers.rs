// storefront/src/web/handlers/account_handlers.rs

use actix_web::web::Bytes;
use actix_web::{web, HttpResponse};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::extractors::AuthenticatedUser;
use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::account", skip(app_state, auth_user), fields(user_id = %auth_user.0.user_id))]
pub async fn account_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let view = app_state.brasa.account(&auth_user.0).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::loyalty", skip(app_state, auth_user), fields(user_id = %auth_user.0.user_id))]
pub async fn loyalty_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ledger = app_state.brasa.loyalty(&auth_user.0).await?;
  Ok(HttpResponse::Ok().json(ledger))
}

/// The pickup ticket for one order. Visible to its owner and to administrators.
#[instrument(name = "handler::ticket", skip(app_state, auth_user, path), fields(order_id = %path.as_ref()))]
pub async fn ticket_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let ticket = app_state.brasa.ticket(&auth_user.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(ticket))
}

pub(crate) fn sse_frame<T: Serialize>(event: &str, payload: &T) -> Result<Bytes, AppError> {
  let data = serde_json::to_string(payload).map_err(|e| AppError::Internal(format!("Failed to encode event: {}", e)))?;
  Ok(Bytes::from(format!("event: {}\ndata: {}\n\n", event, data)))
}

/// Server-sent events: the current account view, then a fresh one after every
/// change to one of the customer's orders. The feed subscription lives exactly
/// as long as the response stream.
#[instrument(name = "handler::account_stream", skip(app_state, auth_user), fields(user_id = %auth_user.0.user_id))]
pub async fn account_stream_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let AuthenticatedUser(customer) = auth_user;
  let watch = app_state.brasa.watch_account(&customer);
  let initial = sse_frame("account", &app_state.brasa.account(&customer).await?)?;
  info!("Account stream opened for {}.", customer.user_id);

  let updates = stream::unfold(watch, |mut watch| async move {
    let frame = match watch.next().await? {
      Ok(view) => sse_frame("account", &view),
      Err(err) => {
        warn!(error = %err, "Account refresh failed; notifying client.");
        sse_frame("error", &json!({"error": err.to_string()}))
      }
    };
    Some((frame, watch))
  });

  Ok(
    HttpResponse::Ok()
      .content_type("text/event-stream")
      .insert_header(("Cache-Control", "no-cache"))
      .streaming(stream::once(async move { Ok::<_, AppError>(initial) }).chain(updates)),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frames_follow_the_event_stream_format() {
    let frame = sse_frame("account", &json!({"orders": []})).unwrap();
    assert_eq!(&frame[..], b"event: account\ndata: {\"orders\":[]}\n\n");
  }
}
