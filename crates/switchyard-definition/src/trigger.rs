use serde::{Deserialize, Serialize};

/// A condition that starts a workflow.
///
/// Both variants are carried verbatim; binding them to an event bus or a
/// scheduler is the deployer's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Trigger {
  /// Fires when an external event with this name arrives.
  Event { on: String },
  /// Fires on a cron-like schedule. The expression is not interpreted.
  Schedule { every: String },
}

impl Trigger {
  pub fn event(name: impl Into<String>) -> Self {
    Trigger::Event { on: name.into() }
  }

  pub fn schedule(expression: impl Into<String>) -> Self {
    Trigger::Schedule {
      every: expression.into(),
    }
  }
}

impl std::fmt::Display for Trigger {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Trigger::Event { on } => write!(f, "on '{}'", on),
      Trigger::Schedule { every } => write!(f, "every '{}'", every),
    }
  }
}
