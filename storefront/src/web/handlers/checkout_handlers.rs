// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use brasa::CheckoutRequest;
use tracing::{info, instrument};

use super::extractors::AuthenticatedUser;
use crate::errors::AppError;
use crate::state::AppState;

#[instrument(
    name = "handler::place_order",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.0.user_id, quantity = req_payload.quantity, redeem_reward = req_payload.redeem_reward)
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let AuthenticatedUser(customer) = auth_user;
  let placed = app_state.brasa.place_order(&customer, req_payload.into_inner()).await?;

  info!(
    "Order {} placed by {}: total {} cents, status {}.",
    placed.order.id, customer.user_id, placed.order.total_cents, placed.order.status
  );
  Ok(HttpResponse::Created().json(placed))
}
