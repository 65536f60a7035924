// core/src/workflow/registry.rs

//! `WorkflowRegistry<E>`: a type-keyed registry of workflows. The context type
//! of a run selects which workflow executes.

use super::control::FlowOutcome;
use super::definition::Workflow;
use super::error::WorkflowError;
use super::shared::Shared;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait AnyWorkflowRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr>;
}

struct WorkflowWrapper<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<WorkflowError> + Send + Sync + 'static,
{
  workflow: Arc<Workflow<TData, HandlerErr>>,
  _phantom: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> AnyWorkflowRunner<AppErr> for WorkflowWrapper<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<WorkflowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr> {
    let ctx = match ctx_obj.downcast::<Shared<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<Shared<TData>>();
        event!(Level::ERROR, expected_type, "Context object type mismatch.");
        return Err(AppErr::from(WorkflowError::TypeMismatch {
          expected_type: expected_type.to_string(),
        }));
      }
    };
    self.workflow.run(ctx).await.map_err(AppErr::from)
  }
}

/// Holds one workflow per context type.
pub struct WorkflowRegistry<AppErr = WorkflowError>
where
  AppErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  registry: RwLock<HashMap<TypeId, Arc<dyn AnyWorkflowRunner<AppErr>>>>,
}

impl<AppErr> Default for WorkflowRegistry<AppErr>
where
  AppErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> WorkflowRegistry<AppErr>
where
  AppErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      registry: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `workflow` for context type `TData`, replacing any earlier one.
  pub fn register<TData, HandlerErr>(&self, workflow: Workflow<TData, HandlerErr>)
  where
    TData: 'static + Send + Sync,
    HandlerErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    event!(
      Level::DEBUG,
      workflow = workflow.name(),
      tdata_type = %std::any::type_name::<TData>(),
      "Registering workflow."
    );
    let wrapper = WorkflowWrapper::<TData, HandlerErr, AppErr> {
      workflow: Arc::new(workflow),
      _phantom: PhantomData,
    };
    self.registry.write().insert(TypeId::of::<TData>(), Arc::new(wrapper));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the workflow registered for `TData`.
  #[instrument(name = "WorkflowRegistry::run", skip_all, fields(tdata_type = %std::any::type_name::<TData>()))]
  pub async fn run<TData>(&self, ctx: Shared<TData>) -> Result<FlowOutcome, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.registry.read().get(&TypeId::of::<TData>()).cloned();
    let Some(runner) = runner else {
      let type_name = std::any::type_name::<TData>();
      event!(Level::ERROR, "No workflow registered for {}.", type_name);
      return Err(AppErr::from(WorkflowError::Configuration {
        message: format!("No workflow registered for context type {type_name}"),
      }));
    };
    runner.run_erased(Box::new(ctx)).await
  }
}
