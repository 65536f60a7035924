// core/src/workflow/control.rs

//! Signals for steering a workflow run and the outcome of a run.

/// Returned by a step handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  /// Proceed to the next handler / step.
  Continue,
  /// Halt the run without error. Completed steps are NOT compensated.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Stopped,
}
