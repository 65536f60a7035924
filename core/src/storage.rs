// core/src/storage.rs

//! Port to public object storage (avatars).

use async_trait::async_trait;

use crate::store::StoreError;

#[async_trait]
pub trait FileStorage: Send + Sync + 'static {
  /// Stores `bytes` under `key` and returns the public URL.
  async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, StoreError>;
}
