use std::collections::HashSet;

use switchyard_definition::{Diagnostic, Diagnostics, TransitionGraph, WorkflowDefinition};
use tracing::debug;

use crate::ValidationResult;
use crate::codes;
use crate::cycles::find_cycles;

/// Run semantic checks over a parsed workflow.
///
/// The workflow is valid when no error-severity diagnostic is reported.
/// Warnings never affect validity.
pub fn validate(workflow: &WorkflowDefinition) -> ValidationResult {
  let graph = workflow.graph();
  let mut diagnostics = Diagnostics::new();

  check_cycles(&graph, &mut diagnostics);
  check_reachability(&graph, &mut diagnostics);
  check_triggers(workflow, &mut diagnostics);
  check_branches(workflow, &mut diagnostics);

  let valid = !diagnostics.has_errors();
  debug!(
    workflow_id = %workflow.id,
    valid,
    diagnostics = diagnostics.len(),
    "workflow_validated"
  );

  ValidationResult { valid, diagnostics }
}

fn check_cycles(graph: &TransitionGraph, diagnostics: &mut Diagnostics) {
  for cycle in find_cycles(graph) {
    let message = format!("cycle detected: {}", cycle.join(" -> "));
    let step_id = cycle[0].clone();
    diagnostics.push(Diagnostic::error(codes::CYCLE, message).for_step(step_id));
  }
}

fn check_reachability(graph: &TransitionGraph, diagnostics: &mut Diagnostics) {
  let Some(entry) = graph.entry() else { return };
  let reachable = graph.reachable();

  for step_id in graph.steps() {
    if !reachable.contains(step_id) {
      diagnostics.push(
        Diagnostic::warning(
          codes::UNREACHABLE_STEP,
          format!("step '{step_id}' is unreachable from entry step '{entry}'"),
        )
        .for_step(step_id.clone()),
      );
    }
  }
}

fn check_triggers(workflow: &WorkflowDefinition, diagnostics: &mut Diagnostics) {
  let mut seen = HashSet::new();
  let mut reported = HashSet::new();
  for trigger in &workflow.triggers {
    if !seen.insert(trigger) && reported.insert(trigger) {
      diagnostics.push(Diagnostic::warning(
        codes::DUPLICATE_TRIGGER,
        format!("trigger {trigger} is declared more than once"),
      ));
    }
  }
}

fn check_branches(workflow: &WorkflowDefinition, diagnostics: &mut Diagnostics) {
  for step in &workflow.steps {
    if let (Some(success), Some(error)) = (&step.on_success, &step.on_error) {
      if success != error {
        continue;
      }
      diagnostics.push(
        Diagnostic::warning(
          codes::AMBIGUOUS_BRANCH,
          format!(
            "step '{}' uses '{success}' for both onSuccess and onError",
            step.id
          ),
        )
        .for_step(step.id.clone()),
      );
    }
  }
}
