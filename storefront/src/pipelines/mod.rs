// storefront/src/pipelines/mod.rs

//! Workflows the storefront registers on top of the ones the core ships.

use brasa::BrasaService;

pub mod webhook_pipeline;

/// Registers every storefront workflow with the service's registry.
///
/// Called once at startup, after the service is built.
pub fn register_all_pipelines(brasa: &BrasaService) {
  tracing::info!("Registering storefront workflows...");
  webhook_pipeline::register_webhook_workflow(brasa);
  tracing::info!("All storefront workflows registered.");
}
