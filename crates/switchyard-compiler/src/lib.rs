//! Switchyard Compiler
//!
//! Lowers a validated [`WorkflowDefinition`] into the source of a Rust module
//! that runs the workflow as a state machine on `switchyard-runtime`:
//!
//! ```text
//! pub async fn run(invocation: Invocation) -> Result<serde_json::Value, ExecutionError> {
//!     let mut ctx = WorkflowContext::new(WORKFLOW_ID, invocation);
//!     let mut current: Option<&'static str> = Some("validate-order");
//!
//!     while let Some(step) = current {
//!         current = match step {
//!             "validate-order" => match ctx.invoke_json(..).await {
//!                 Ok(_) => Some("process-payment"),
//!                 Err(_) => Some("notify-error"),
//!             },
//!             ..
//!         };
//!     }
//!
//!     Ok(ctx.into_output())
//! }
//! ```
//!
//! Compilation is a pure function of the definition and [`CompileOptions`]:
//! steps and triggers are emitted in definition order and step inputs are
//! serialised with sorted keys, so the same input always yields
//! byte-identical source.
//!
//! Template placeholders in step inputs are emitted verbatim and rendered by
//! the runtime.

pub mod codes;
mod compiler;
mod emitter;
mod options;

use serde::{Deserialize, Serialize};
use switchyard_definition::Diagnostics;

pub use compiler::compile;
pub use options::{CompileOptions, CompileOptionsError};

#[cfg(doc)]
use switchyard_definition::WorkflowDefinition;

/// Output of [`compile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledWorkflow {
  /// Generated module source. Empty when compilation reported errors.
  pub source_code: String,
  pub diagnostics: Diagnostics,
}

impl CompiledWorkflow {
  /// True if no error diagnostic was reported.
  pub fn is_ok(&self) -> bool {
    !self.diagnostics.has_errors()
  }

  pub fn errors(&self) -> Vec<String> {
    self.diagnostics.error_messages()
  }

  pub fn warnings(&self) -> Vec<String> {
    self.diagnostics.warning_messages()
  }
}
