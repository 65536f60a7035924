// storefront/src/web/handlers/profile_handlers.rs

use actix_web::{web, HttpResponse};
use brasa::ProfileUpdate;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::extractors::AuthenticatedUser;
use crate::errors::AppError;
use crate::services::avatar_storage::content_type_for;
use crate::state::AppState;

pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

#[instrument(name = "handler::get_profile", skip(app_state, auth_user), fields(user_id = %auth_user.0.user_id))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let profile = app_state.brasa.profile(&auth_user.0).await?;
  Ok(HttpResponse::Ok().json(profile))
}

#[instrument(name = "handler::update_profile", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.0.user_id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
  let profile = app_state.brasa.update_profile(&auth_user.0, req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(profile))
}

#[derive(Deserialize, Debug)]
pub struct AvatarUploadQuery {
  pub file_name: String,
}

/// Raw image bytes in the body; the original file name only picks the extension.
#[instrument(
    name = "handler::upload_avatar",
    skip(app_state, auth_user, body),
    fields(user_id = %auth_user.0.user_id, file_name = %query.file_name, size = body.len())
)]
pub async fn upload_avatar_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<AvatarUploadQuery>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  if body.len() > MAX_AVATAR_BYTES {
    return Err(AppError::Validation(format!(
      "Avatar exceeds {} bytes",
      MAX_AVATAR_BYTES
    )));
  }
  let profile = app_state
    .brasa
    .upload_avatar(&auth_user.0, &query.file_name, &body)
    .await?;
  info!("Avatar updated for {}.", auth_user.0.user_id);
  Ok(HttpResponse::Ok().json(profile))
}

/// Serves files written by the local avatar storage.
#[instrument(name = "handler::serve_avatar", skip(app_state))]
pub async fn serve_avatar_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let key = path.into_inner();
  let file = app_state
    .avatars
    .path_for(&key)
    .ok_or_else(|| AppError::NotFound(format!("Avatar '{}' not found.", key)))?;
  match tokio::fs::read(&file).await {
    Ok(bytes) => Ok(
      HttpResponse::Ok()
        .content_type(content_type_for(&key))
        .insert_header(("Cache-Control", "public, max-age=86400"))
        .body(bytes),
    ),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!("Avatar '{}' not found.", key))),
    Err(e) => {
      warn!(error = %e, "Failed to read avatar file.");
      Err(AppError::Internal(format!("Failed to read avatar: {}", e)))
    }
  }
}
