// core/src/workflow/execution.rs

//! `Workflow::run()`: sequential step execution with reverse compensation.

use super::control::{Flow, FlowOutcome};
use super::definition::Workflow;
use super::error::WorkflowError;
use super::shared::Shared;
use super::step::StepDef;
use tracing::{event, info_span, instrument, Instrument, Level};

enum StepOutcome {
  Skipped,
  Ran(Flow),
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx`.
  ///
  /// On the first handler error, compensators of the steps that completed are
  /// run newest-first. A failing compensator is logged and the remaining ones
  /// still run; the caller always receives the original error.
  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(workflow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: Shared<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Workflow execution starting.");
    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = info_span!(
        "workflow_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      match self.run_step(step_def, &ctx).instrument(step_span).await {
        Ok(StepOutcome::Skipped) => {}
        Ok(StepOutcome::Ran(Flow::Continue)) => completed.push(step_def.name.as_str()),
        Ok(StepOutcome::Ran(Flow::Stop)) => {
          event!(Level::INFO, step = %step_def.name, "Workflow stopped by handler.");
          return Ok(FlowOutcome::Stopped);
        }
        Err(err) => {
          event!(Level::WARN, step = %step_def.name, error = %err, "Step failed, compensating completed steps.");
          self.compensate(&completed, &ctx).await;
          return Err(err);
        }
      }
    }

    event!(Level::DEBUG, "Workflow execution completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx: &Shared<TData>) -> Result<StepOutcome, Err> {
    let skip = step_def.skip_if.as_ref().map_or(false, |cond| cond(&*ctx.read()));
    if skip {
      event!(Level::DEBUG, "Step skipped by condition.");
      return Ok(StepOutcome::Skipped);
    }

    let handlers = match self.handlers.get(&step_def.name) {
      Some(handlers) if !handlers.is_empty() => handlers,
      _ if step_def.optional => {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepOutcome::Skipped);
      }
      _ => {
        event!(Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(WorkflowError::HandlerMissing {
          workflow: self.name.clone(),
          step_name: step_def.name.clone(),
        }));
      }
    };

    for handler in handlers {
      if handler(ctx.clone()).await? == Flow::Stop {
        return Ok(StepOutcome::Ran(Flow::Stop));
      }
    }
    Ok(StepOutcome::Ran(Flow::Continue))
  }

  async fn compensate(&self, completed: &[&str], ctx: &Shared<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensator) = self.compensators.get(*step_name) else {
        continue;
      };
      event!(Level::INFO, step = %step_name, "Compensating step.");
      if let Err(err) = compensator(ctx.clone()).await {
        event!(Level::ERROR, step = %step_name, error = %err, "Compensation failed.");
      }
    }
  }
}
