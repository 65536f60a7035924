// core/src/workflow/hooks.rs

//! Registration of step handlers and compensators.

use super::control::Flow;
use super::definition::{Compensator, Handler, Workflow};
use super::error::WorkflowError;
use super::shared::Shared;
use std::future::Future;

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Appends a handler to `step_name`. Handlers of one step run in registration order.
  pub fn on_step<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(Shared<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<Flow, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx| {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.handlers.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Sets the compensator for `step_name`, replacing any previous one.
  pub fn compensate_step<F, UserErr>(
    &mut self,
    step_name: &str,
    compensator_fn: impl Fn(Shared<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let compensator: Compensator<TData, Err> = Box::new(move |ctx| {
      let fut = compensator_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.compensators.insert(step_name.to_string(), compensator);
  }
}
