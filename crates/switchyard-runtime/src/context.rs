//! Per-execution workflow state.
//!
//! [`WorkflowContext`] is what a compiled workflow (and the in-process
//! [`WorkflowMachine`](crate::WorkflowMachine)) drives its dispatch loop
//! through. Each `invoke` renders the step input, calls the service proxy and
//! records the outcome so later steps can reference it:
//!
//! ```json
//! { "amount": "{{ steps['validate-order'].total }}", "order": "{{ event.orderId }}" }
//! ```
//!
//! Templates see four variables: `event`, `config`, `steps` (outputs keyed by
//! step id) and `error` (the most recent step failure, or none).

use std::sync::Arc;

use minijinja::Environment;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::ExecutionError;
use crate::executable::Invocation;

/// Mutable state of one workflow execution.
pub struct WorkflowContext {
  workflow: String,
  invocation: Invocation,
  steps: Map<String, Value>,
  last_step: Option<String>,
  last_error: Option<Value>,
}

impl WorkflowContext {
  pub fn new(workflow: impl Into<String>, invocation: Invocation) -> Self {
    Self {
      workflow: workflow.into(),
      invocation,
      steps: Map::new(),
      last_step: None,
      last_error: None,
    }
  }

  pub fn workflow(&self) -> &str {
    &self.workflow
  }

  pub fn event(&self) -> &Value {
    &self.invocation.event
  }

  /// Recorded output of a step that has already run.
  pub fn step_output(&self, step_id: &str) -> Option<&Value> {
    self.steps.get(step_id)
  }

  pub fn last_step(&self) -> Option<&str> {
    self.last_step.as_deref()
  }

  pub fn cancellation_token(&self) -> &CancellationToken {
    &self.invocation.cancel
  }

  /// Run one step: render its input, call the action, record the outcome.
  ///
  /// A failed action is recorded under the step id as `{"error": {...}}` and
  /// exposed to later templates as `error`.
  #[instrument(
    name = "workflow_step",
    skip(self, input),
    fields(
      execution_id = %self.invocation.execution_id,
      workflow = %self.workflow,
    )
  )]
  pub async fn invoke(
    &mut self,
    step_id: &str,
    action: &str,
    input: &Value,
  ) -> Result<Value, ExecutionError> {
    if self.invocation.cancel.is_cancelled() {
      return Err(ExecutionError::Cancelled);
    }

    let resolved = self.render_input(step_id, input)?;
    let proxy = Arc::clone(&self.invocation.proxy);
    self.last_step = Some(step_id.to_string());

    match proxy.call(action, resolved).await {
      Ok(output) => {
        debug!("step_completed");
        self.steps.insert(step_id.to_string(), output.clone());
        Ok(output)
      }
      Err(source) => {
        warn!(error = %source, "step_failed");
        let failure = json!({
          "step": step_id,
          "action": action,
          "message": source.to_string(),
        });
        self
          .steps
          .insert(step_id.to_string(), json!({ "error": failure.clone() }));
        self.last_error = Some(failure);
        Err(ExecutionError::StepFailed {
          step_id: step_id.to_string(),
          source,
        })
      }
    }
  }

  /// Like [`invoke`](Self::invoke), with the input given as JSON text.
  ///
  /// Generated workflows embed step inputs this way.
  pub async fn invoke_json(
    &mut self,
    step_id: &str,
    action: &str,
    input: &str,
  ) -> Result<Value, ExecutionError> {
    let input: Value = serde_json::from_str(input).map_err(|e| ExecutionError::InputResolution {
      step_id: step_id.to_string(),
      message: format!("step input is not valid JSON: {}", e),
    })?;
    self.invoke(step_id, action, &input).await
  }

  /// Final workflow output: every recorded step result plus the last step.
  pub fn into_output(self) -> Value {
    json!({
      "steps": Value::Object(self.steps),
      "last_step": self.last_step,
    })
  }

  fn render_input(&self, step_id: &str, input: &Value) -> Result<Value, ExecutionError> {
    let env = Environment::new();
    let context = minijinja::Value::from_serialize(json!({
      "event": self.invocation.event,
      "config": self.invocation.config,
      "steps": self.steps,
      "error": self.last_error,
    }));
    render_value(&env, step_id, input, &context)
  }
}

/// Recursively render templates in a JSON value.
fn render_value(
  env: &Environment,
  step_id: &str,
  value: &Value,
  context: &minijinja::Value,
) -> Result<Value, ExecutionError> {
  match value {
    Value::String(s) if s.contains("{{") || s.contains("{%") => {
      let resolution_error = |e: minijinja::Error| ExecutionError::InputResolution {
        step_id: step_id.to_string(),
        message: e.to_string(),
      };
      // A string that is only `{{ expr }}` keeps the expression's own type
      if let Some(expr) = pure_expression(s) {
        let value = env
          .compile_expression(expr)
          .and_then(|compiled| compiled.eval(context))
          .map_err(resolution_error)?;
        return to_json(step_id, &value);
      }
      let rendered = env
        .render_str(s, context.clone())
        .map_err(resolution_error)?;
      Ok(Value::String(rendered))
    }
    Value::Array(items) => items
      .iter()
      .map(|item| render_value(env, step_id, item, context))
      .collect::<Result<Vec<_>, _>>()
      .map(Value::Array),
    Value::Object(fields) => {
      let mut rendered = Map::new();
      for (key, field) in fields {
        rendered.insert(key.clone(), render_value(env, step_id, field, context)?);
      }
      Ok(Value::Object(rendered))
    }
    _ => Ok(value.clone()),
  }
}

/// The inner expression of a string that is exactly one `{{ ... }}` block.
fn pure_expression(s: &str) -> Option<&str> {
  let inner = s.trim().strip_prefix("{{")?.strip_suffix("}}")?;
  if inner.contains("{{") || inner.contains("}}") {
    return None;
  }
  let inner = inner.strip_prefix('-').unwrap_or(inner);
  let inner = inner.strip_suffix('-').unwrap_or(inner);
  Some(inner.trim())
}

fn to_json(step_id: &str, value: &minijinja::Value) -> Result<Value, ExecutionError> {
  if value.is_undefined() || value.is_none() {
    return Ok(Value::Null);
  }
  serde_json::to_value(value).map_err(|e| ExecutionError::InputResolution {
    step_id: step_id.to_string(),
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ActionError;
  use crate::proxy::{EchoProxy, ServiceRegistry};

  fn context_with(proxy: impl crate::ServiceProxy + 'static, event: Value) -> WorkflowContext {
    let invocation = Invocation::new(event, json!({ "region": "eu" }), Arc::new(proxy));
    WorkflowContext::new("test", invocation)
  }

  #[tokio::test]
  async fn test_renders_event_and_config() {
    let mut ctx = context_with(EchoProxy, json!({ "orderId": "o-1", "qty": 3 }));
    let output = ctx
      .invoke(
        "a",
        "$.Any.run",
        &json!({
          "order": "{{ event.orderId }}",
          "qty": "{{ event.qty }}",
          "label": "order {{ event.orderId }} in {{ config.region }}",
          "nested": ["{{ config.region }}", 7],
          "flag": true
        }),
      )
      .await
      .unwrap();

    assert_eq!(
      output,
      json!({
        "order": "o-1",
        "qty": 3,
        "label": "order o-1 in eu",
        "nested": ["eu", 7],
        "flag": true
      })
    );
  }

  #[tokio::test]
  async fn test_single_placeholder_keeps_source_type() {
    let mut ctx = context_with(
      EchoProxy,
      json!({ "orderId": "12345", "flag": "true", "note": null, "tags": ["a", "b"] }),
    );
    let output = ctx
      .invoke(
        "a",
        "$.Any.run",
        &json!({
          "orderId": "{{ event.orderId }}",
          "flag": "{{ event.flag }}",
          "note": "{{ event.note }}",
          "missing": "{{- event.missing -}}",
          "tags": "{{ event.tags }}",
          "label": "id {{ event.orderId }}"
        }),
      )
      .await
      .unwrap();

    assert_eq!(
      output,
      json!({
        "orderId": "12345",
        "flag": "true",
        "note": null,
        "missing": null,
        "tags": ["a", "b"],
        "label": "id 12345"
      })
    );
  }

  #[tokio::test]
  async fn test_bad_expression_is_input_resolution_error() {
    let mut ctx = context_with(EchoProxy, json!({}));
    let err = ctx
      .invoke("a", "$.Any.run", &json!({ "x": "{{ event.missing.deeper }}" }))
      .await
      .unwrap_err();
    assert_eq!(err.kind(), "input_resolution");
  }

  #[tokio::test]
  async fn test_later_steps_see_earlier_outputs() {
    let mut ctx = context_with(EchoProxy, json!({}));
    ctx
      .invoke("first", "$.Any.run", &json!({ "total": 99 }))
      .await
      .unwrap();
    let output = ctx
      .invoke("second", "$.Any.run", &json!({ "amount": "{{ steps.first.total }}" }))
      .await
      .unwrap();

    assert_eq!(output, json!({ "amount": 99 }));
    assert_eq!(
      ctx.into_output(),
      json!({
        "steps": { "first": { "total": 99 }, "second": { "amount": 99 } },
        "last_step": "second"
      })
    );
  }

  #[tokio::test]
  async fn test_failure_is_recorded_and_exposed_as_error() {
    let mut registry = ServiceRegistry::new();
    registry.register_fn("$.Fail.run", |_| async {
      Err::<Value, _>(ActionError::failed("$.Fail.run", "boom"))
    });
    registry.register_fn("$.Echo.run", |input| async move { Ok::<_, ActionError>(input) });
    let mut ctx = context_with(registry, json!({}));

    let err = ctx.invoke("charge", "$.Fail.run", &json!({})).await.unwrap_err();
    assert_eq!(err.kind(), "step_failed");

    let output = ctx
      .invoke("notify", "$.Echo.run", &json!({ "why": "{{ error.message }}" }))
      .await
      .unwrap();
    assert_eq!(output, json!({ "why": "action '$.Fail.run' failed: boom" }));
    assert_eq!(
      ctx.step_output("charge").unwrap()["error"]["step"],
      json!("charge")
    );
  }

  #[tokio::test]
  async fn test_invalid_json_input() {
    let mut ctx = context_with(EchoProxy, json!({}));
    let err = ctx.invoke_json("a", "$.Any.run", "{not json").await.unwrap_err();
    assert_eq!(err.kind(), "input_resolution");
    assert!(ctx.last_step().is_none());
  }

  #[tokio::test]
  async fn test_cancelled_context_refuses_to_run() {
    let mut ctx = context_with(EchoProxy, json!({}));
    ctx.cancellation_token().cancel();
    let err = ctx.invoke("a", "$.Any.run", &json!({})).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Cancelled));
  }
}
