//! Trigger registration.
//!
//! Compiled workflows and [`WorkflowMachine`](crate::WorkflowMachine) announce
//! their triggers through [`TriggerRegistry`]. The runtime does not fire
//! triggers itself; whoever owns the registry maps incoming events and
//! schedules to workflow names and calls `execute`.

use serde::{Deserialize, Serialize};

/// Sink for trigger bindings.
pub trait TriggerRegistry {
  /// Run `workflow` whenever an event named `event` arrives.
  fn on_event(&mut self, workflow: &str, event: &str);

  /// Run `workflow` on a schedule. The expression is passed through verbatim.
  fn on_schedule(&mut self, workflow: &str, expression: &str);
}

/// A single recorded binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerBinding {
  Event { workflow: String, event: String },
  Schedule { workflow: String, expression: String },
}

impl TriggerBinding {
  pub fn workflow(&self) -> &str {
    match self {
      Self::Event { workflow, .. } | Self::Schedule { workflow, .. } => workflow,
    }
  }
}

/// In-memory [`TriggerRegistry`] that keeps bindings in registration order.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
  bindings: Vec<TriggerBinding>,
}

impl TriggerTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn bindings(&self) -> &[TriggerBinding] {
    &self.bindings
  }

  /// Workflows bound to an event name, in registration order.
  pub fn workflows_for_event(&self, event: &str) -> Vec<&str> {
    self
      .bindings
      .iter()
      .filter_map(|binding| match binding {
        TriggerBinding::Event { workflow, event: e } if e == event => Some(workflow.as_str()),
        _ => None,
      })
      .collect()
  }

  /// All schedule bindings as `(workflow, expression)`.
  pub fn schedules(&self) -> Vec<(&str, &str)> {
    self
      .bindings
      .iter()
      .filter_map(|binding| match binding {
        TriggerBinding::Schedule {
          workflow,
          expression,
        } => Some((workflow.as_str(), expression.as_str())),
        _ => None,
      })
      .collect()
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }
}

impl TriggerRegistry for TriggerTable {
  fn on_event(&mut self, workflow: &str, event: &str) {
    self.bindings.push(TriggerBinding::Event {
      workflow: workflow.to_string(),
      event: event.to_string(),
    });
  }

  fn on_schedule(&mut self, workflow: &str, expression: &str) {
    self.bindings.push(TriggerBinding::Schedule {
      workflow: workflow.to_string(),
      expression: expression.to_string(),
    });
  }
}
