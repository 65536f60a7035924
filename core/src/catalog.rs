// core/src/catalog.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{BrasaError, BrasaResult};
use crate::loyalty::LoyaltyLedger;
use crate::models::{Product, ProductDraft};
use crate::service::BrasaService;
use crate::session::Session;

/// Everything the landing page needs.
#[derive(Debug, Clone, Serialize)]
pub struct StorefrontView {
  pub product: Option<Product>,
  pub is_open: bool,
  pub opens_at: u32,
  pub closes_at: u32,
  /// Present for signed-in visitors.
  pub loyalty: Option<LoyaltyLedger>,
}

fn validate_draft(draft: &ProductDraft) -> BrasaResult<()> {
  if draft.name.trim().is_empty() {
    return Err(BrasaError::Validation("product name is required".to_string()));
  }
  if draft.price_cents <= 0 {
    return Err(BrasaError::Validation("product price must be positive".to_string()));
  }
  Ok(())
}

impl BrasaService {
  pub async fn storefront(&self, viewer: Option<&Session>) -> BrasaResult<StorefrontView> {
    self.storefront_at(viewer, Utc::now()).await
  }

  pub async fn storefront_at(&self, viewer: Option<&Session>, now: DateTime<Utc>) -> BrasaResult<StorefrontView> {
    let product = self.store.active_product().await?;
    let loyalty = match viewer {
      Some(session) => Some(self.loyalty(session).await?),
      None => None,
    };
    Ok(StorefrontView {
      product,
      is_open: self.config.is_open(now),
      opens_at: self.config.hours.opens_at(),
      closes_at: self.config.hours.closes_at(),
      loyalty,
    })
  }

  pub async fn list_products(&self, admin: &Session) -> BrasaResult<Vec<Product>> {
    admin.require_admin()?;
    Ok(self.store.list_products().await?)
  }

  #[instrument(name = "BrasaService::create_product", skip(self, admin), err(Display))]
  pub async fn create_product(&self, admin: &Session, draft: ProductDraft) -> BrasaResult<Product> {
    admin.require_admin()?;
    validate_draft(&draft)?;
    let product = Product {
      id: Uuid::new_v4(),
      name: draft.name.trim().to_string(),
      price_cents: draft.price_cents,
      stock: draft.stock,
      active: draft.active,
      created_at: Utc::now(),
    };
    self.store.save_product(&product).await?;
    info!("Product {} ({}) created.", product.id, product.name);
    Ok(product)
  }

  #[instrument(name = "BrasaService::update_product", skip(self, admin), err(Display))]
  pub async fn update_product(&self, admin: &Session, id: Uuid, draft: ProductDraft) -> BrasaResult<Product> {
    admin.require_admin()?;
    validate_draft(&draft)?;
    let mut product = self.store.product(id).await?.ok_or(BrasaError::ProductNotFound(id))?;
    product.name = draft.name.trim().to_string();
    product.price_cents = draft.price_cents;
    product.stock = draft.stock;
    product.active = draft.active;
    self.store.save_product(&product).await?;
    Ok(product)
  }

  pub async fn delete_product(&self, admin: &Session, id: Uuid) -> BrasaResult<()> {
    admin.require_admin()?;
    if !self.store.delete_product(id).await? {
      return Err(BrasaError::ProductNotFound(id));
    }
    info!("Product {} deleted.", id);
    Ok(())
  }
}
