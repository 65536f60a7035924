// storefront/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use brasa::models::ProductDraft;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::extractors::AdminUser;
use crate::errors::AppError;
use crate::state::AppState;

// --- Orders ---

#[instrument(name = "handler::admin_orders", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let rows = app_state.brasa.admin_orders(&admin.0).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": rows })))
}

#[instrument(
    name = "handler::approve_payment",
    skip(app_state, admin, path),
    fields(admin_id = %admin.0.user_id, order_id = %path.as_ref())
)]
pub async fn approve_payment_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.brasa.approve_payment(&admin.0, path.into_inner()).await?;
  info!("Order {} is now {}.", order.id, order.status);
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::dashboard", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn dashboard_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let summary = app_state.brasa.dashboard(&admin.0).await?;
  Ok(HttpResponse::Ok().json(summary))
}

// --- Products ---

#[instrument(name = "handler::list_products", skip(app_state, admin))]
pub async fn list_products_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let products = app_state.brasa.list_products(&admin.0).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::create_product", skip(app_state, admin, req_payload), fields(name = %req_payload.name))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req_payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.brasa.create_product(&admin.0, req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(app_state, admin, path, req_payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProductDraft>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .brasa
    .update_product(&admin.0, path.into_inner(), req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::delete_product", skip(app_state, admin, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.brasa.delete_product(&admin.0, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
