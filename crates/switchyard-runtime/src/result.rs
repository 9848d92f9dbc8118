//! Execution result types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// Final status of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Succeeded,
  Failed,
}

/// Normalised failure description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFailure {
  pub message: String,
  /// Category such as `timeout`, `panic` or `not_registered`.
  pub kind: String,
}

impl From<&ExecutionError> for ExecutionFailure {
  fn from(error: &ExecutionError) -> Self {
    Self {
      message: error.to_string(),
      kind: error.kind().to_string(),
    }
  }
}

/// Outcome of a single [`Runtime::execute`](crate::Runtime::execute) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
  /// Unique execution ID (UUID v4).
  pub execution_id: String,
  pub status: ExecutionStatus,
  /// Wall-clock time from the start of `execute` until the executable
  /// settled or the timeout fired.
  pub duration_ms: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outputs: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<ExecutionFailure>,
}

impl ExecutionResult {
  pub(crate) fn succeeded(
    execution_id: String,
    duration: Duration,
    output: serde_json::Value,
  ) -> Self {
    Self {
      execution_id,
      status: ExecutionStatus::Succeeded,
      duration_ms: millis(duration),
      outputs: Some(output),
      error: None,
    }
  }

  pub(crate) fn failed(execution_id: String, duration: Duration, error: &ExecutionError) -> Self {
    Self {
      execution_id,
      status: ExecutionStatus::Failed,
      duration_ms: millis(duration),
      outputs: None,
      error: Some(error.into()),
    }
  }

  pub fn is_succeeded(&self) -> bool {
    self.status == ExecutionStatus::Succeeded
  }
}

fn millis(duration: Duration) -> u64 {
  u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
