//! Execution events and notifiers for observability.
//!
//! The runtime emits one start event and exactly one terminal event per
//! execution. Consumers plug in a notifier to persist, stream or count them.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted by [`Runtime::execute`](crate::Runtime::execute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// An executable was resolved and is about to run.
  ExecutionStarted {
    execution_id: String,
    workflow: String,
  },

  /// The executable settled with an output.
  ExecutionSucceeded {
    execution_id: String,
    workflow: String,
    duration_ms: u64,
  },

  /// The executable failed, panicked, or was never registered.
  ExecutionFailed {
    execution_id: String,
    workflow: String,
    error: String,
  },

  /// The runtime stopped waiting for the executable.
  ExecutionTimedOut {
    execution_id: String,
    workflow: String,
    timeout_ms: u64,
  },
}

impl ExecutionEvent {
  pub fn execution_id(&self) -> &str {
    match self {
      Self::ExecutionStarted { execution_id, .. }
      | Self::ExecutionSucceeded { execution_id, .. }
      | Self::ExecutionFailed { execution_id, .. }
      | Self::ExecutionTimedOut { execution_id, .. } => execution_id,
    }
  }
}

/// Trait for receiving execution events.
pub trait ExecutionNotifier: Send + Sync {
  /// Called when an execution event occurs.
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls `execute`. Volume is two
  // events per execution.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
