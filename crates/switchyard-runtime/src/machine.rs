//! In-process workflow state machine.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchyard_definition::{Trigger, WorkflowDefinition};
use tracing::{debug, instrument};

use crate::context::WorkflowContext;
use crate::error::ExecutionError;
use crate::executable::{Executable, Invocation};
use crate::triggers::TriggerRegistry;

/// Runs a [`WorkflowDefinition`] directly, without generating code.
///
/// The loop is the same one the compiler emits: start at the first step,
/// follow `onSuccess` after a successful action, `onError` after a failed
/// one, stop when the chosen branch is absent. A failure with no error branch
/// fails the execution.
///
/// The number of dispatched steps is bounded by the number of steps in the
/// definition, so an unvalidated cycle fails instead of spinning forever.
#[derive(Debug, Clone)]
pub struct WorkflowMachine {
  workflow: Arc<WorkflowDefinition>,
}

impl WorkflowMachine {
  pub fn new(workflow: WorkflowDefinition) -> Self {
    Self {
      workflow: Arc::new(workflow),
    }
  }

  pub fn workflow(&self) -> &WorkflowDefinition {
    &self.workflow
  }

  /// Register the definition's triggers under its id.
  pub fn register_triggers(&self, registry: &mut dyn TriggerRegistry) {
    for trigger in &self.workflow.triggers {
      match trigger {
        Trigger::Event { on } => registry.on_event(&self.workflow.id, on),
        Trigger::Schedule { every } => registry.on_schedule(&self.workflow.id, every),
      }
    }
  }

  #[instrument(
    name = "workflow_machine_run",
    skip(self, invocation),
    fields(
      workflow = %self.workflow.id,
      execution_id = %invocation.execution_id,
    )
  )]
  async fn run(&self, invocation: Invocation) -> Result<Value, ExecutionError> {
    let mut ctx = WorkflowContext::new(self.workflow.id.as_str(), invocation);
    let limit = self.workflow.steps.len();
    let mut dispatched = 0;
    let mut current = self.workflow.first_step().map(|step| step.id.as_str());

    while let Some(step_id) = current {
      let step = self
        .workflow
        .get_step(step_id)
        .ok_or_else(|| ExecutionError::UnknownStep {
          step_id: step_id.to_string(),
        })?;

      if dispatched == limit {
        return Err(ExecutionError::StepLimitExceeded { limit });
      }
      dispatched += 1;

      current = match ctx.invoke(&step.id, &step.action, &step.input_json()).await {
        Ok(_) => step.on_success.as_deref(),
        Err(err) => match step.on_error.as_deref() {
          Some(target) => {
            debug!(step_id = %step.id, target = %target, "following_error_branch");
            Some(target)
          }
          None => return Err(err),
        },
      };
    }

    Ok(ctx.into_output())
  }
}

#[async_trait]
impl Executable for WorkflowMachine {
  async fn execute(&self, invocation: Invocation) -> Result<Value, ExecutionError> {
    self.run(invocation).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::triggers::TriggerTable;
  use switchyard_definition::Step;

  fn definition(steps: Vec<Step>) -> WorkflowDefinition {
    WorkflowDefinition {
      id: "machine-test".to_string(),
      name: "Machine test".to_string(),
      version: "1".to_string(),
      triggers: vec![Trigger::event("order.created"), Trigger::schedule("@hourly")],
      steps,
      ..Default::default()
    }
  }

  #[test]
  fn test_register_triggers() {
    let machine = WorkflowMachine::new(definition(vec![Step::new("a", "$.A.run")]));
    let mut table = TriggerTable::new();
    machine.register_triggers(&mut table);

    assert_eq!(table.workflows_for_event("order.created"), vec!["machine-test"]);
    assert_eq!(table.schedules(), vec![("machine-test", "@hourly")]);
  }
}
