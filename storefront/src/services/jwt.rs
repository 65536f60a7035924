// storefront/src/services/jwt.rs

//! Verifies access tokens issued by the auth provider and turns their claims
//! into a [`Session`].

use brasa::{Role, Session};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

pub const EXPECTED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
  #[serde(default)]
  pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
  pub sub: String,
  #[serde(default)]
  pub email: Option<String>,
  pub aud: String,
  pub exp: usize,
  /// Set server-side by the auth provider; users cannot edit it.
  #[serde(default)]
  pub app_metadata: AppMetadata,
}

impl AccessClaims {
  fn role(&self) -> Role {
    match self.app_metadata.role.as_deref() {
      Some("admin") => Role::Admin,
      _ => Role::Customer,
    }
  }
}

pub struct JwtVerifier {
  key: DecodingKey,
  validation: Validation,
}

impl JwtVerifier {
  pub fn new(secret: &str) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[EXPECTED_AUDIENCE]);
    Self {
      key: DecodingKey::from_secret(secret.as_bytes()),
      validation,
    }
  }

  pub fn verify(&self, token: &str) -> Result<Session, AppError> {
    let data = jsonwebtoken::decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|e| {
      debug!("JWT validation failed: {e}");
      AppError::Auth("Invalid or expired token".to_string())
    })?;
    let claims = data.claims;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Auth("Token subject is not a user id".to_string()))?;
    Ok(Session {
      user_id,
      email: claims.email.clone().unwrap_or_default(),
      role: claims.role(),
    })
  }
}
