//! The checked-in fixture is both the expected compiler output and a module
//! compiled into this test, so generated code is known to build and run.

#[rustfmt::skip]
#[path = "fixtures/refund.rs"]
mod refund;

use std::sync::Arc;

use serde_json::{Value, json};
use switchyard_compiler::{CompileOptions, compile};
use switchyard_parser::parse;
use switchyard_runtime::{
  ActionError, ExecutionStatus, Runtime, ServiceProxy, ServiceRegistry, TriggerTable,
};

const REFUND_WORKFLOW: &str = r#"
id: refund
kind: Workflow
name: Refund
version: "2"
triggers:
  - on: refund.requested
steps:
  - id: check
    action: $.Refunds.check
    input:
      orderId: "{{ event.orderId }}"
    onSuccess: pay
    onError: reject
  - id: pay
    action: $.Payments.refund
    input:
      amount: "{{ steps.check.amount }}"
      reason: customer request
  - id: reject
    action: $.Email.send
    input:
      template: refund-rejected
"#;

const EXPECTED: &str = include_str!("fixtures/refund.rs");

fn services() -> Arc<dyn ServiceProxy> {
  let mut registry = ServiceRegistry::new();
  registry.register_fn("$.Refunds.check", |input: Value| async move {
    match input["orderId"].as_str() {
      Some("o-1") => Ok(json!({ "amount": 25 })),
      _ => Err(ActionError::failed("$.Refunds.check", "order not refundable")),
    }
  });
  registry.register_fn("$.Payments.refund", |input: Value| async move {
    Ok::<_, ActionError>(json!({ "refunded": input["amount"], "reason": input["reason"] }))
  });
  registry.register_fn("$.Email.send", |input: Value| async move {
    Ok::<_, ActionError>(json!({ "sent": input["template"] }))
  });
  Arc::new(registry)
}

#[test]
fn test_output_matches_fixture() {
  let parsed = parse(REFUND_WORKFLOW);
  assert!(parsed.is_valid(), "{:?}", parsed.errors());

  let compiled = compile(&parsed.workflow, &CompileOptions::default());
  assert!(compiled.diagnostics.is_empty(), "{:?}", compiled.diagnostics);
  assert_eq!(compiled.source_code, EXPECTED);
}

#[test]
fn test_generated_constants_and_triggers() {
  assert_eq!(refund::WORKFLOW_ID, "refund");
  assert_eq!(refund::WORKFLOW_VERSION, "2");

  let mut table = TriggerTable::new();
  refund::register_triggers(&mut table);
  assert_eq!(table.workflows_for_event("refund.requested"), vec!["refund"]);
}

#[tokio::test]
async fn test_generated_module_runs_success_path() {
  let runtime = Runtime::default();
  runtime.register(refund::WORKFLOW_ID, refund::run);

  let result = runtime
    .execute("refund", json!({ "orderId": "o-1" }), json!({}), services())
    .await;

  assert_eq!(result.status, ExecutionStatus::Succeeded, "{:?}", result.error);
  assert_eq!(
    result.outputs.unwrap(),
    json!({
      "steps": {
        "check": { "amount": 25 },
        "pay": { "refunded": 25, "reason": "customer request" }
      },
      "last_step": "pay"
    })
  );
}

#[tokio::test]
async fn test_generated_module_runs_error_branch() {
  let runtime = Runtime::default();
  runtime.register(refund::WORKFLOW_ID, refund::run);

  let result = runtime
    .execute("refund", json!({ "orderId": "o-9" }), json!({}), services())
    .await;

  assert_eq!(result.status, ExecutionStatus::Succeeded, "{:?}", result.error);
  let output = result.outputs.unwrap();
  assert_eq!(output["last_step"], "reject");
  assert_eq!(output["steps"]["reject"], json!({ "sent": "refund-rejected" }));
  assert!(output["steps"].get("pay").is_none());
}
