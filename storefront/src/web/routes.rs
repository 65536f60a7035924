// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  account_handlers, admin_handlers, checkout_handlers, profile_handlers, scanner_handlers, storefront_handlers,
  webhook_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route(
      "/avatars/{key}",
      web::get().to(profile_handlers::serve_avatar_handler),
    )
    .service(
      web::scope("/api/v1")
        .route("/health", web::get().to(health_check_handler))
        .route("/storefront", web::get().to(storefront_handlers::storefront_handler))
        // Customer
        .route("/orders", web::post().to(checkout_handlers::place_order_handler))
        .route("/orders/{order_id}", web::get().to(account_handlers::ticket_handler))
        .service(
          web::scope("/me")
            .route("/account", web::get().to(account_handlers::account_handler))
            .route("/account/stream", web::get().to(account_handlers::account_stream_handler))
            .route("/loyalty", web::get().to(account_handlers::loyalty_handler))
            .route("/profile", web::get().to(profile_handlers::get_profile_handler))
            .route("/profile", web::put().to(profile_handlers::update_profile_handler))
            .service(
              web::resource("/avatar")
                .app_data(web::PayloadConfig::new(profile_handlers::MAX_AVATAR_BYTES))
                .route(web::post().to(profile_handlers::upload_avatar_handler)),
            ),
        )
        // Back office
        .service(
          web::scope("/admin")
            .route("/dashboard", web::get().to(admin_handlers::dashboard_handler))
            .route("/orders", web::get().to(admin_handlers::list_orders_handler))
            .route(
              "/orders/{order_id}/approve",
              web::post().to(admin_handlers::approve_payment_handler),
            )
            .route("/products", web::get().to(admin_handlers::list_products_handler))
            .route("/products", web::post().to(admin_handlers::create_product_handler))
            .route("/products/{product_id}", web::put().to(admin_handlers::update_product_handler))
            .route(
              "/products/{product_id}",
              web::delete().to(admin_handlers::delete_product_handler),
            )
            .route("/scanner", web::get().to(scanner_handlers::scanner_state_handler))
            .route("/scanner", web::delete().to(scanner_handlers::scanner_close_handler))
            .route("/scanner/scan", web::post().to(scanner_handlers::scan_handler))
            .route("/scanner/reset", web::post().to(scanner_handlers::scanner_reset_handler)),
        )
        // Payment provider
        .service(
          web::scope("/webhooks").route(
            "/mercadopago",
            web::post().to(webhook_handlers::payment_webhook_handler),
          ),
        ),
    );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::pipelines;
  use crate::services::{JwtVerifier, LocalDirStorage, SandboxGateway};
  use crate::state::AppState;
  use actix_web::{http::StatusCode, test, App};
  use brasa::models::Product;
  use brasa::{BrasaService, MemoryStore, Store};
  use jsonwebtoken::{EncodingKey, Header};
  use serde_json::{json, Value};
  use std::sync::Arc;
  use std::time::Duration;
  use uuid::Uuid;

  const SECRET: &str = "route-test-secret";

  fn bearer(user_id: Uuid, role: Option<&str>) -> (&'static str, String) {
    let claims = json!({
      "sub": user_id.to_string(),
      "email": "user@brasa.test",
      "aud": "authenticated",
      "exp": chrono::Utc::now().timestamp() + 600,
      "app_metadata": { "role": role },
    });
    let token = jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
    ("Authorization", format!("Bearer {}", token))
  }

  async fn app_state() -> AppState {
    let config = AppConfig::from_lookup(|key| match key {
      "JWT_SECRET" => Some(SECRET.to_string()),
      "APP_BASE_URL" => Some("https://brasa.test".to_string()),
      _ => None,
    })
    .unwrap();
    let store = Arc::new(MemoryStore::new());
    store
      .save_product(&Product {
        id: Uuid::new_v4(),
        name: "Saco de carvão 5kg".to_string(),
        price_cents: 1000,
        stock: 5,
        active: true,
        created_at: chrono::Utc::now(),
      })
      .await
      .unwrap();
    let avatars = Arc::new(LocalDirStorage::new(std::env::temp_dir(), &config.avatar_public_base_url));
    let brasa = BrasaService::new(
      store,
      Arc::new(SandboxGateway::new(Duration::ZERO)),
      avatars.clone(),
      config.brasa_config().unwrap(),
    );
    pipelines::register_all_pipelines(&brasa);
    AppState::new(brasa, Arc::new(config), Arc::new(JwtVerifier::new(SECRET)), avatars)
  }

  #[actix_web::test]
  async fn checkout_then_pickup_over_http() {
    let state = app_state().await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;
    let customer = Uuid::new_v4();
    let admin = Uuid::new_v4();

    let req = test::TestRequest::post()
      .uri("/api/v1/orders")
      .insert_header(bearer(customer, None))
      .set_json(json!({ "quantity": 2 }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let placed: Value = test::read_body_json(resp).await;
    assert_eq!(placed["order"]["status"], "AWAITING_PAYMENT");
    let order_id = placed["order"]["id"].as_str().unwrap().to_string();
    let ticket_url = placed["ticket_url"].as_str().unwrap().to_string();

    // Scanning before payment is rejected without changing the order.
    let req = test::TestRequest::post()
      .uri("/api/v1/admin/scanner/scan")
      .insert_header(bearer(admin, Some("admin")))
      .set_json(json!({ "code": ticket_url }))
      .to_request();
    let state_body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state_body["state"], "rejected");

    let req = test::TestRequest::post()
      .uri(&format!("/api/v1/admin/orders/{}/approve", order_id))
      .insert_header(bearer(admin, Some("admin")))
      .to_request();
    let approved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(approved["status"], "PAID");

    let req = test::TestRequest::post()
      .uri("/api/v1/admin/scanner/scan")
      .insert_header(bearer(admin, Some("admin")))
      .set_json(json!({ "code": ticket_url }))
      .to_request();
    let state_body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state_body["state"], "delivered");
    assert_eq!(state_body["receipt"]["quantity_handed_over"], 2);
  }

  #[actix_web::test]
  async fn admin_routes_require_the_admin_role() {
    let state = app_state().await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/admin/orders").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
      .uri("/api/v1/admin/orders")
      .insert_header(bearer(Uuid::new_v4(), None))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
      .uri("/api/v1/admin/dashboard")
      .insert_header(bearer(Uuid::new_v4(), Some("admin")))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
  }

  #[actix_web::test]
  async fn oversized_orders_are_a_conflict_and_leave_no_order() {
    let state = app_state().await;
    let brasa = state.brasa.clone();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

    let req = test::TestRequest::post()
      .uri("/api/v1/orders")
      .insert_header(bearer(Uuid::new_v4(), None))
      .set_json(json!({ "quantity": 6 }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert!(brasa.store().all_orders().await.unwrap().is_empty());
  }

  #[actix_web::test]
  async fn irrelevant_webhooks_are_acknowledged() {
    let state = app_state().await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;
    let req = test::TestRequest::post()
      .uri("/api/v1/webhooks/mercadopago")
      .set_payload(r#"{"action":"merchant_order.updated"}"#)
      .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["received"], true);
  }
}
