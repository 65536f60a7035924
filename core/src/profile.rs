// core/src/profile.rs
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{BrasaError, BrasaResult};
use crate::models::Profile;
use crate::service::BrasaService;
use crate::session::Session;

/// Keeps at most 11 digits and renders them as `(DD) DDDDD-DDDD`, partially
/// while the number is still being typed.
pub fn format_phone(input: &str) -> String {
  let digits: String = input.chars().filter(char::is_ascii_digit).take(11).collect();
  match digits.len() {
    0 => String::new(),
    1..=2 => format!("({digits}"),
    3..=7 => format!("({}) {}", &digits[..2], &digits[2..]),
    _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
  }
}

/// Object key for an uploaded avatar: `{user_id}-{random}.{ext}`.
pub fn avatar_key(user_id: Uuid, file_name: &str) -> String {
  let ext = file_name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    .unwrap_or_else(|| "bin".to_string());
  format!("{}-{}.{}", user_id, Uuid::new_v4().simple(), ext)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
  pub full_name: Option<String>,
  pub phone: Option<String>,
}

impl BrasaService {
  pub async fn profile(&self, session: &Session) -> BrasaResult<Profile> {
    Ok(self.store.profile(session.user_id).await?.unwrap_or_else(|| Profile {
      user_id: session.user_id,
      ..Profile::default()
    }))
  }

  #[instrument(name = "BrasaService::update_profile", skip_all, fields(user_id = %session.user_id), err(Display))]
  pub async fn update_profile(&self, session: &Session, update: ProfileUpdate) -> BrasaResult<Profile> {
    let mut profile = self.profile(session).await?;
    if let Some(name) = update.full_name {
      let name = name.trim();
      profile.full_name = (!name.is_empty()).then(|| name.to_string());
    }
    if let Some(phone) = update.phone {
      let formatted = format_phone(&phone);
      profile.phone = (!formatted.is_empty()).then_some(formatted);
    }
    self.store.save_profile(&profile).await?;
    info!("Profile of {} updated.", session.user_id);
    Ok(profile)
  }

  #[instrument(name = "BrasaService::upload_avatar", skip(self, session, bytes), fields(user_id = %session.user_id, size = bytes.len()), err(Display))]
  pub async fn upload_avatar(&self, session: &Session, file_name: &str, bytes: &[u8]) -> BrasaResult<Profile> {
    if bytes.is_empty() {
      return Err(BrasaError::Validation("avatar file is empty".to_string()));
    }
    let key = avatar_key(session.user_id, file_name);
    let url = self.storage.upload(&key, bytes).await?;

    let mut profile = self.profile(session).await?;
    profile.avatar_url = Some(url);
    self.store.save_profile(&profile).await?;
    Ok(profile)
  }
}
