// core/src/workflow/mod.rs

//! A small async workflow engine: named steps with optional skip conditions,
//! early stop, reverse-order compensation on failure, and a type-keyed
//! registry. Checkout and webhook processing are built on it.

pub mod control;
pub mod definition;
pub mod error;
pub mod execution;
pub mod hooks;
pub mod registry;
pub mod shared;
pub mod step;

pub use control::{Flow, FlowOutcome};
pub use definition::Workflow;
pub use error::WorkflowError;
pub use registry::WorkflowRegistry;
pub use shared::Shared;
pub use step::{skip_when, SkipCondition, StepDef};
