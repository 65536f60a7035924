// core/src/workflow/definition.rs

//! The `Workflow<TData, Err>` struct and its structural construction.

use super::control::Flow;
use super::error::WorkflowError;
use super::shared::Shared;
use super::step::{SkipCondition, StepDef};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

pub type StepFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A boxed step handler.
pub type Handler<TData, Err> = Box<dyn Fn(Shared<TData>) -> StepFuture<Result<Flow, Err>> + Send + Sync>;

/// Undoes the effect of a step that already completed, when a later step fails.
pub type Compensator<TData, Err> = Box<dyn Fn(Shared<TData>) -> StepFuture<Result<(), Err>> + Send + Sync>;

/// An ordered list of named steps run against a shared `TData`.
///
/// Handlers return `Result<Flow, Err>`. When a handler fails, every step that
/// had already completed is compensated in reverse order and the original
/// error is returned.
pub struct Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) compensators: HashMap<String, Compensator<TData, Err>>,
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Creates a workflow from `(name, optional, skip_if)` step definitions.
  pub fn new(name: impl Into<String>, step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      name: name.into(),
      steps,
      handlers: HashMap::new(),
      compensators: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics when `step_name` is not part of the definition. A typo here is a
  /// wiring bug, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Workflow setup error: step '{}' not found in workflow '{}'.",
        step_name, self.name
      );
    }
  }
}
