// storefront/src/web/handlers/extractors.rs

use actix_web::{web, FromRequest, HttpRequest};
use brasa::{BrasaError, Session};
use futures_util::future::{ready, Ready};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
struct TokenQuery {
  access_token: Option<String>,
}

/// Bearer token from the `Authorization` header, or from `?access_token=` for
/// clients that cannot set headers (browser `EventSource`).
fn bearer_token(req: &HttpRequest) -> Option<String> {
  let from_header = req
    .headers()
    .get(actix_web::http::header::AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(|t| t.trim().to_string());
  from_header.or_else(|| {
    web::Query::<TokenQuery>::from_query(req.query_string())
      .ok()
      .and_then(|q| q.into_inner().access_token)
  })
}

fn session_from(req: &HttpRequest) -> Result<Option<Session>, AppError> {
  let Some(token) = bearer_token(req) else {
    return Ok(None);
  };
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("AppState is not registered".to_string()))?;
  state.jwt.verify(&token).map(Some)
}

/// A signed-in user. Rejects anonymous requests with 401.
#[derive(Debug)]
pub struct AuthenticatedUser(pub Session);

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(match session_from(req) {
      Ok(Some(session)) => Ok(AuthenticatedUser(session)),
      Ok(None) => {
        warn!(path = %req.path(), "AuthenticatedUser extractor: missing bearer token.");
        Err(AppError::Brasa(BrasaError::Unauthorized))
      }
      Err(e) => Err(e),
    })
  }
}

/// A signed-in administrator. 401 when anonymous, 403 for customers.
#[derive(Debug)]
pub struct AdminUser(pub Session);

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(match session_from(req) {
      Ok(Some(session)) if session.is_admin() => Ok(AdminUser(session)),
      Ok(Some(session)) => {
        warn!(user_id = %session.user_id, path = %req.path(), "Non-admin attempted an admin route.");
        Err(AppError::Brasa(BrasaError::Forbidden))
      }
      Ok(None) => Err(AppError::Brasa(BrasaError::Unauthorized)),
      Err(e) => Err(e),
    })
  }
}

/// The caller's session if a token was sent; anonymous otherwise.
#[derive(Debug)]
pub struct MaybeUser(pub Option<Session>);

impl FromRequest for MaybeUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(session_from(req).map(MaybeUser))
  }
}
