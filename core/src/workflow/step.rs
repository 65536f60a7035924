// core/src/workflow/step.rs

use std::sync::Arc;

/// Evaluated against the run's state right before a step executes; `true` skips it.
pub type SkipCondition<T> = Arc<dyn Fn(&T) -> bool + Send + Sync + 'static>;

/// A named step of a [`super::Workflow`].
#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

/// Convenience for building a [`SkipCondition`] from a closure.
pub fn skip_when<T, F>(condition: F) -> Option<SkipCondition<T>>
where
  T: 'static + Send + Sync,
  F: Fn(&T) -> bool + Send + Sync + 'static,
{
  Some(Arc::new(condition))
}
