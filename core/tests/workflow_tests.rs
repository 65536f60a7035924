// tests/workflow_tests.rs
mod common;

use brasa::workflow::skip_when;
use brasa::{Flow, FlowOutcome, Shared, Workflow, WorkflowError, WorkflowRegistry};
use common::setup_tracing;

#[derive(Debug, Default)]
struct Trail {
  ran: Vec<String>,
  undone: Vec<String>,
  skip_middle: bool,
  stop_at: Option<&'static str>,
}

#[derive(Debug, thiserror::Error)]
enum TrailError {
  #[error("workflow: {0}")]
  Workflow(#[from] WorkflowError),
  #[error("step {0} failed")]
  Step(&'static str),
  #[error("undo of {0} failed")]
  Undo(&'static str),
}

fn record(step: &'static str) -> impl Fn(Shared<Trail>) -> std::future::Ready<Result<Flow, TrailError>> {
  move |ctx: Shared<Trail>| {
    let mut guard = ctx.write();
    guard.ran.push(step.to_string());
    let flow = if guard.stop_at == Some(step) { Flow::Stop } else { Flow::Continue };
    std::future::ready(Ok(flow))
  }
}

fn undo(step: &'static str) -> impl Fn(Shared<Trail>) -> std::future::Ready<Result<(), TrailError>> {
  move |ctx: Shared<Trail>| {
    ctx.write().undone.push(step.to_string());
    std::future::ready(Ok(()))
  }
}

fn three_steps() -> Workflow<Trail, TrailError> {
  let mut wf = Workflow::<Trail, TrailError>::new(
    "three",
    &[
      ("first", false, None),
      ("middle", false, skip_when(|t: &Trail| t.skip_middle)),
      ("last", false, None),
    ],
  );
  wf.on_step("first", record("first"));
  wf.compensate_step("first", undo("first"));
  wf.on_step("middle", record("middle"));
  wf.compensate_step("middle", undo("middle"));
  wf.on_step("last", record("last"));
  wf
}

#[tokio::test]
async fn runs_steps_in_order() {
  setup_tracing();
  let wf = three_steps();
  let ctx = Shared::new(Trail::default());

  let outcome = wf.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  assert_eq!(ctx.read().ran, vec!["first", "middle", "last"]);
  assert!(ctx.read().undone.is_empty());
}

#[tokio::test]
async fn skip_condition_reads_current_state() {
  setup_tracing();
  let wf = three_steps();
  let ctx = Shared::new(Trail {
    skip_middle: true,
    ..Trail::default()
  });

  wf.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().ran, vec!["first", "last"]);
}

#[tokio::test]
async fn stop_halts_without_compensation() {
  setup_tracing();
  let wf = three_steps();
  let ctx = Shared::new(Trail {
    stop_at: Some("middle"),
    ..Trail::default()
  });

  let outcome = wf.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Stopped);
  assert_eq!(ctx.read().ran, vec!["first", "middle"]);
  assert!(ctx.read().undone.is_empty());
}

#[tokio::test]
async fn failure_compensates_completed_steps_newest_first() {
  setup_tracing();
  let mut wf = three_steps();
  wf.on_step("last", |_ctx: Shared<Trail>| async { Err::<Flow, _>(TrailError::Step("last")) });
  let ctx = Shared::new(Trail::default());

  let err = wf.run(ctx.clone()).await.unwrap_err();

  assert!(matches!(err, TrailError::Step("last")));
  assert_eq!(ctx.read().undone, vec!["middle", "first"]);
}

#[tokio::test]
async fn skipped_steps_are_not_compensated() {
  setup_tracing();
  let mut wf = three_steps();
  wf.on_step("last", |_ctx: Shared<Trail>| async { Err::<Flow, _>(TrailError::Step("last")) });
  let ctx = Shared::new(Trail {
    skip_middle: true,
    ..Trail::default()
  });

  wf.run(ctx.clone()).await.unwrap_err();

  assert_eq!(ctx.read().undone, vec!["first"]);
}

#[tokio::test]
async fn failing_compensator_does_not_mask_original_error() {
  setup_tracing();
  let mut wf = three_steps();
  wf.compensate_step("middle", |_ctx: Shared<Trail>| async { Err::<(), _>(TrailError::Undo("middle")) });
  wf.on_step("last", |_ctx: Shared<Trail>| async { Err::<Flow, _>(TrailError::Step("last")) });
  let ctx = Shared::new(Trail::default());

  let err = wf.run(ctx.clone()).await.unwrap_err();

  assert!(matches!(err, TrailError::Step("last")));
  assert_eq!(ctx.read().undone, vec!["first"]);
}

#[tokio::test]
async fn missing_handler_on_required_step_is_an_error() {
  setup_tracing();
  let mut wf = Workflow::<Trail, TrailError>::new("gappy", &[("first", false, None), ("second", false, None)]);
  wf.on_step("first", record("first"));
  wf.compensate_step("first", undo("first"));
  let ctx = Shared::new(Trail::default());

  let err = wf.run(ctx.clone()).await.unwrap_err();

  assert!(matches!(
    err,
    TrailError::Workflow(WorkflowError::HandlerMissing { ref step_name, .. }) if step_name == "second"
  ));
  assert_eq!(ctx.read().undone, vec!["first"]);
}

#[tokio::test]
async fn optional_step_without_handler_is_skipped() {
  setup_tracing();
  let mut wf = Workflow::<Trail, TrailError>::new("optional", &[("first", false, None), ("extra", true, None)]);
  wf.on_step("first", record("first"));

  assert_eq!(wf.run(Shared::new(Trail::default())).await.unwrap(), FlowOutcome::Completed);
}

#[test]
#[should_panic(expected = "step 'nope' not found")]
fn registering_unknown_step_panics() {
  let mut wf = Workflow::<Trail, TrailError>::new("strict", &[("first", false, None)]);
  wf.on_step("nope", record("nope"));
}

#[tokio::test]
async fn registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = WorkflowRegistry::<TrailError>::new();
  registry.register(three_steps());
  assert!(registry.is_registered::<Trail>());

  let ctx = Shared::new(Trail::default());
  let outcome = registry.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  assert_eq!(ctx.read().ran.len(), 3);
}

#[tokio::test]
async fn registry_rejects_unregistered_context() {
  setup_tracing();
  let registry = WorkflowRegistry::<TrailError>::new();

  let err = registry.run(Shared::new(0u32)).await.unwrap_err();

  assert!(matches!(err, TrailError::Workflow(WorkflowError::Configuration { .. })));
}
