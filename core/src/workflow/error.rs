// core/src/workflow/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("Handler missing for non-optional step '{step_name}' in workflow '{workflow}'")]
  HandlerMissing { workflow: String, step_name: String },

  #[error("Type mismatch during context downcast (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Configuration error: {message}")]
  Configuration { message: String },

  #[error("Error in step handler. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for WorkflowError {
  fn from(err: AnyhowError) -> Self {
    WorkflowError::Handler { source: err }
  }
}
