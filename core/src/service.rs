// core/src/service.rs
use std::sync::Arc;
use tracing::{event, Level};

use crate::checkout;
use crate::config::BrasaConfig;
use crate::error::BrasaError;
use crate::gateway::PaymentGateway;
use crate::models::Order;
use crate::realtime::{ChangeEvent, ChangeFeed};
use crate::storage::FileStorage;
use crate::store::Store;
use crate::workflow::WorkflowRegistry;

/// Entry point for every storefront operation. Cheap to clone.
#[derive(Clone)]
pub struct BrasaService {
  pub(crate) store: Arc<dyn Store>,
  pub(crate) gateway: Arc<dyn PaymentGateway>,
  pub(crate) storage: Arc<dyn FileStorage>,
  pub(crate) feed: Arc<ChangeFeed>,
  pub(crate) config: Arc<BrasaConfig>,
  pub(crate) workflows: Arc<WorkflowRegistry<BrasaError>>,
}

impl BrasaService {
  pub fn new(
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    storage: Arc<dyn FileStorage>,
    config: BrasaConfig,
  ) -> Self {
    let service = Self {
      store,
      gateway,
      storage,
      feed: Arc::new(ChangeFeed::default()),
      config: Arc::new(config),
      workflows: Arc::new(WorkflowRegistry::new()),
    };
    service.workflows.register(checkout::checkout_workflow());
    event!(Level::INFO, "Brasa service initialized.");
    service
  }

  pub fn store(&self) -> &Arc<dyn Store> {
    &self.store
  }

  pub fn gateway(&self) -> &Arc<dyn PaymentGateway> {
    &self.gateway
  }

  pub fn feed(&self) -> &Arc<ChangeFeed> {
    &self.feed
  }

  pub fn config(&self) -> &BrasaConfig {
    &self.config
  }

  /// Registry shared by the built-in workflows and any the host application adds.
  pub fn workflows(&self) -> &Arc<WorkflowRegistry<BrasaError>> {
    &self.workflows
  }

  pub(crate) fn publish(&self, order: &Order) {
    self.feed.publish(ChangeEvent::from(order));
  }
}
