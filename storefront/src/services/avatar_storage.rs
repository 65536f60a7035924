// storefront/src/services/avatar_storage.rs

use async_trait::async_trait;
use brasa::{FileStorage, StoreError};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Writes avatars into a local directory served back under `public_base_url`.
pub struct LocalDirStorage {
  root: PathBuf,
  public_base_url: String,
}

impl LocalDirStorage {
  pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
    Self {
      root: root.into(),
      public_base_url: public_base_url.trim_end_matches('/').to_string(),
    }
  }

  /// Resolves `key` inside the storage root. Keys are flat file names.
  pub fn path_for(&self, key: &str) -> Option<PathBuf> {
    let valid = !key.is_empty()
      && !key.starts_with('.')
      && key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    valid.then(|| self.root.join(key))
  }
}

pub fn content_type_for(key: &str) -> &'static str {
  match key.rsplit_once('.').map(|(_, ext)| ext) {
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  }
}

#[async_trait]
impl FileStorage for LocalDirStorage {
  #[instrument(name = "avatar_storage::upload", skip(self, bytes), fields(size = bytes.len()))]
  async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, StoreError> {
    let path = self
      .path_for(key)
      .ok_or_else(|| StoreError::Malformed(format!("invalid storage key '{}'", key)))?;
    tokio::fs::create_dir_all(&self.root)
      .await
      .map_err(|e| StoreError::Backend(anyhow::Error::new(e).context("creating avatar directory")))?;
    tokio::fs::write(&path, bytes)
      .await
      .map_err(|e| StoreError::Backend(anyhow::Error::new(e).context("writing avatar file")))?;
    info!(path = %path.display(), "Avatar stored.");
    Ok(format!("{}/{}", self.public_base_url, key))
  }
}
