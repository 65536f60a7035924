// storefront/src/web/handlers/storefront_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use super::extractors::MaybeUser;
use crate::errors::AppError;
use crate::state::AppState;

/// Product on sale, opening hours and, for signed-in customers, their loyalty balance.
#[instrument(name = "handler::storefront", skip(app_state, viewer))]
pub async fn storefront_handler(app_state: web::Data<AppState>, viewer: MaybeUser) -> Result<HttpResponse, AppError> {
  let view = app_state.brasa.storefront(viewer.0.as_ref()).await?;
  Ok(HttpResponse::Ok().json(view))
}
