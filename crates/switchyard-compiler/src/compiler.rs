use std::collections::HashSet;

use switchyard_definition::{Diagnostic, Diagnostics, Step, Trigger, WorkflowDefinition};
use tracing::debug;

use crate::CompiledWorkflow;
use crate::codes;
use crate::emitter::{Emitter, literal};
use crate::options::{CompileOptions, REGISTER_TRIGGERS};

/// Compile a workflow definition into a Rust module.
///
/// The module exposes `WORKFLOW_ID`, `WORKFLOW_VERSION`, an optional
/// `register_triggers` function and an async entry function that can be
/// registered with `switchyard_runtime::Runtime::register`.
///
/// Output depends only on the definition and the options. When any error
/// diagnostic is reported the source code is empty.
pub fn compile(workflow: &WorkflowDefinition, options: &CompileOptions) -> CompiledWorkflow {
  let mut diagnostics = Diagnostics::new();

  if let Err(err) = options.check() {
    diagnostics.push(Diagnostic::error(err.code(), err.to_string()));
  }
  check_definition(workflow, options, &mut diagnostics);

  let source_code = if diagnostics.has_errors() {
    String::new()
  } else {
    generate(workflow, options)
  };

  debug!(
    workflow_id = %workflow.id,
    steps = workflow.steps.len(),
    bytes = source_code.len(),
    diagnostics = diagnostics.len(),
    "workflow_compiled"
  );

  CompiledWorkflow {
    source_code,
    diagnostics,
  }
}

fn check_definition(
  workflow: &WorkflowDefinition,
  options: &CompileOptions,
  diagnostics: &mut Diagnostics,
) {
  if workflow.steps.is_empty() {
    diagnostics.push(Diagnostic::error(
      codes::NO_STEPS,
      "workflow has no steps to compile",
    ));
  }

  let mut seen = HashSet::new();
  for step in &workflow.steps {
    if !seen.insert(step.id.as_str()) {
      diagnostics.push(
        Diagnostic::error(
          codes::DUPLICATE_STEP,
          format!("duplicate step id '{}'", step.id),
        )
        .for_step(step.id.clone()),
      );
    }
  }

  for step in &workflow.steps {
    let transitions = [
      ("onSuccess", step.on_success.as_deref()),
      ("onError", step.on_error.as_deref()),
    ];
    for (field, target) in transitions {
      let Some(target) = target else { continue };
      if !seen.contains(target) {
        diagnostics.push(
          Diagnostic::error(
            codes::UNKNOWN_TARGET,
            format!(
              "step '{}' {} references unknown step '{}'",
              step.id, field, target
            ),
          )
          .for_step(step.id.clone()),
        );
      }
    }
  }

  if options.emit_triggers && workflow.triggers.is_empty() {
    diagnostics.push(Diagnostic::warning(
      codes::NO_TRIGGERS,
      format!("workflow has no triggers; {} will register nothing", REGISTER_TRIGGERS),
    ));
  }
}

fn generate(workflow: &WorkflowDefinition, options: &CompileOptions) -> String {
  let mut out = Emitter::default();

  if options.emit_header {
    out.line(format!(
      "// Generated by switchyard-compiler from workflow {} version {}.",
      literal(&workflow.id),
      literal(&workflow.version)
    ));
    out.line("// Do not edit by hand.");
    out.blank();
  }

  if options.emit_triggers {
    out.line(
      "use switchyard_runtime::{ExecutionError, Invocation, TriggerRegistry, WorkflowContext};",
    );
  } else {
    out.line("use switchyard_runtime::{ExecutionError, Invocation, WorkflowContext};");
  }
  out.blank();

  out.line(format!(
    "pub const WORKFLOW_ID: &str = {};",
    literal(&workflow.id)
  ));
  out.line(format!(
    "pub const WORKFLOW_VERSION: &str = {};",
    literal(&workflow.version)
  ));
  out.blank();

  if options.emit_triggers {
    emit_triggers(&mut out, &workflow.triggers);
    out.blank();
  }

  emit_entry(&mut out, workflow, &options.entry_name);
  out.finish()
}

fn emit_triggers(out: &mut Emitter, triggers: &[Trigger]) {
  if triggers.is_empty() {
    out.line(format!(
      "pub fn {}(_registry: &mut dyn TriggerRegistry) {{}}",
      REGISTER_TRIGGERS
    ));
    return;
  }

  out.line(format!(
    "pub fn {}(registry: &mut dyn TriggerRegistry) {{",
    REGISTER_TRIGGERS
  ));
  out.indent();
  for trigger in triggers {
    match trigger {
      Trigger::Event { on } => {
        out.line(format!("registry.on_event(WORKFLOW_ID, {});", literal(on)));
      }
      Trigger::Schedule { every } => {
        out.line(format!(
          "registry.on_schedule(WORKFLOW_ID, {});",
          literal(every)
        ));
      }
    }
  }
  out.dedent();
  out.line("}");
}

fn emit_entry(out: &mut Emitter, workflow: &WorkflowDefinition, entry_name: &str) {
  // Checked by the caller: a workflow with no steps never reaches codegen.
  let first = workflow
    .first_step()
    .map(|step| step.id.as_str())
    .unwrap_or_default();

  out.line(format!(
    "pub async fn {}(invocation: Invocation) -> Result<serde_json::Value, ExecutionError> {{",
    entry_name
  ));
  out.indent();
  out.line("let mut ctx = WorkflowContext::new(WORKFLOW_ID, invocation);");
  out.line(format!(
    "let mut current: Option<&'static str> = Some({});",
    literal(first)
  ));
  out.blank();
  out.line("while let Some(step) = current {");
  out.indent();
  out.line("current = match step {");
  out.indent();

  for step in &workflow.steps {
    emit_step_arm(out, step);
  }

  out.line("other => {");
  out.indent();
  out.line("return Err(ExecutionError::UnknownStep {");
  out.indent();
  out.line("step_id: other.to_string(),");
  out.dedent();
  out.line("});");
  out.dedent();
  out.line("}");

  out.dedent();
  out.line("};");
  out.dedent();
  out.line("}");
  out.blank();
  out.line("Ok(ctx.into_output())");
  out.dedent();
  out.line("}");
}

fn emit_step_arm(out: &mut Emitter, step: &Step) {
  let input = step.input_json().to_string();
  out.line(format!(
    "{} => match ctx.invoke_json({}, {}, {}).await {{",
    literal(&step.id),
    literal(&step.id),
    literal(&step.action),
    literal(&input)
  ));
  out.indent();

  match &step.on_success {
    Some(target) => out.line(format!("Ok(_) => Some({}),", literal(target))),
    None => out.line("Ok(_) => None,"),
  }
  match &step.on_error {
    Some(target) => out.line(format!("Err(_) => Some({}),", literal(target))),
    None => out.line("Err(err) => return Err(err),"),
  }

  out.dedent();
  out.line("},");
}
