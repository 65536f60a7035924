// core/src/session.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BrasaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Customer,
  Admin,
}

/// The signed-in principal, as established by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub user_id: Uuid,
  pub email: String,
  pub role: Role,
}

impl Session {
  pub fn customer(user_id: Uuid, email: impl Into<String>) -> Self {
    Self {
      user_id,
      email: email.into(),
      role: Role::Customer,
    }
  }

  pub fn admin(user_id: Uuid, email: impl Into<String>) -> Self {
    Self {
      user_id,
      email: email.into(),
      role: Role::Admin,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn require_admin(&self) -> Result<(), BrasaError> {
    if self.is_admin() {
      Ok(())
    } else {
      Err(BrasaError::Forbidden)
    }
  }
}
