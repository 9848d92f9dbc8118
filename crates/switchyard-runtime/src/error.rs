//! Runtime error types.

/// Errors raised while running a workflow executable.
///
/// The runtime never returns these from [`Runtime::execute`]; they are folded
/// into a failed [`ExecutionResult`] using [`ExecutionError::kind`] and the
/// display message.
///
/// [`Runtime::execute`]: crate::Runtime::execute
/// [`ExecutionResult`]: crate::ExecutionResult
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
  /// No executable is registered under the requested name.
  #[error("workflow '{name}' is not registered")]
  NotRegistered { name: String },

  /// The executable did not settle before the timeout.
  #[error("execution timed out after {timeout_ms}ms")]
  Timeout { timeout_ms: u64 },

  /// The executable panicked.
  #[error("executable panicked: {message}")]
  Panicked { message: String },

  /// Execution was cancelled.
  #[error("execution cancelled")]
  Cancelled,

  /// A step's action failed and the step has no error branch.
  #[error("step '{step_id}' failed: {source}")]
  StepFailed {
    step_id: String,
    #[source]
    source: ActionError,
  },

  /// Dispatch reached a step id the workflow does not define.
  #[error("unknown step '{step_id}'")]
  UnknownStep { step_id: String },

  /// Step input could not be decoded or rendered.
  #[error("input resolution failed for step '{step_id}': {message}")]
  InputResolution { step_id: String, message: String },

  /// The dispatch loop ran more steps than the workflow defines.
  #[error("step limit of {limit} exceeded, the workflow contains a cycle")]
  StepLimitExceeded { limit: usize },

  /// Free-form failure raised by a hand-written executable.
  #[error("{message}")]
  Failed { message: String },
}

impl ExecutionError {
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
    }
  }

  /// Stable, machine-readable category used in execution results.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::NotRegistered { .. } => "not_registered",
      Self::Timeout { .. } => "timeout",
      Self::Panicked { .. } => "panic",
      Self::Cancelled => "cancelled",
      Self::StepFailed { .. } => "step_failed",
      Self::UnknownStep { .. } => "unknown_step",
      Self::InputResolution { .. } => "input_resolution",
      Self::StepLimitExceeded { .. } => "step_limit_exceeded",
      Self::Failed { .. } => "error",
    }
  }
}

/// Errors raised by a service proxy while running an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
  /// The proxy has no handler for the action identifier.
  #[error("unknown action '{action}'")]
  UnknownAction { action: String },

  /// The action input did not match the handler's input type.
  #[error("invalid input for action '{action}': {source}")]
  InvalidInput {
    action: String,
    #[source]
    source: serde_json::Error,
  },

  /// The action ran and reported a failure.
  #[error("action '{action}' failed: {message}")]
  Failed { action: String, message: String },
}

impl ActionError {
  pub fn failed(action: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Failed {
      action: action.into(),
      message: message.into(),
    }
  }
}
