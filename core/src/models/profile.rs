// core/src/models/profile.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub user_id: Uuid,
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub avatar_url: Option<String>,
}
