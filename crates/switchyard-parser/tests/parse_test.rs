//! Integration tests for workflow document parsing.

use serde_json::json;
use switchyard_definition::{InputValue, Trigger};
use switchyard_parser::{codes, parse};

const ORDER_WORKFLOW: &str = r#"
id: order-fulfilment
kind: Workflow
name: Order fulfilment
description: Validate, charge and confirm an order
version: "1.0.0"
triggers:
  - on: order.created
  - every: "0 * * * *"
steps:
  - id: validate-order
    action: $.Orders.validate
    input:
      orderId: "{{ event.orderId }}"
      strict: true
    onSuccess: process-payment
    onError: notify-error
  - id: process-payment
    action: $.Payments.capture
    input:
      amount: "{{ steps['validate-order'].total }}"
    onSuccess: confirm
    onError: notify-error
  - id: confirm
    action: $.Email.send
    input:
      template: order-confirmed
  - id: notify-error
    action: $.Slack.post
metadata:
  owner: fulfilment-team
"#;

#[test]
fn test_parse_order_workflow() {
  let result = parse(ORDER_WORKFLOW);

  assert!(result.errors().is_empty(), "{:?}", result.errors());
  assert!(result.warnings().is_empty(), "{:?}", result.warnings());

  let workflow = &result.workflow;
  assert_eq!(workflow.id, "order-fulfilment");
  assert_eq!(workflow.name, "Order fulfilment");
  assert_eq!(workflow.version, "1.0.0");
  assert_eq!(
    workflow.description.as_deref(),
    Some("Validate, charge and confirm an order")
  );
  assert_eq!(
    workflow.triggers,
    vec![Trigger::event("order.created"), Trigger::schedule("0 * * * *")]
  );

  let ids: Vec<&str> = workflow.steps.iter().map(|s| s.id.as_str()).collect();
  assert_eq!(
    ids,
    vec!["validate-order", "process-payment", "confirm", "notify-error"]
  );

  let validate = workflow.get_step("validate-order").unwrap();
  assert_eq!(validate.action, "$.Orders.validate");
  assert_eq!(validate.on_success.as_deref(), Some("process-payment"));
  assert_eq!(validate.on_error.as_deref(), Some("notify-error"));
  assert_eq!(
    validate.input["orderId"],
    InputValue::Template("{{ event.orderId }}".to_string())
  );
  assert_eq!(validate.input["strict"], InputValue::Literal(json!(true)));

  let confirm = workflow.get_step("confirm").unwrap();
  assert!(confirm.on_success.is_none());
  assert!(confirm.on_error.is_none());

  assert_eq!(workflow.metadata["owner"], json!("fulfilment-team"));
}

#[test]
fn test_parse_json_document() {
  let document = json!({
    "id": "json-flow",
    "kind": "Workflow",
    "name": "JSON flow",
    "version": "3",
    "triggers": [{ "on": "ping" }],
    "steps": [
      { "id": "a", "action": "$.A.run", "onSuccess": "b" },
      { "id": "b", "action": "$.B.run", "onError": null }
    ]
  })
  .to_string();

  let result = parse(&document);
  assert!(result.is_valid(), "{:?}", result.errors());
  assert_eq!(result.workflow.steps.len(), 2);
  assert!(result.workflow.steps[1].on_error.is_none());
}

#[test]
fn test_unknown_transition_target_names_the_step() {
  let document = ORDER_WORKFLOW.replace("onSuccess: confirm", "onSuccess: confirm-order");
  let result = parse(&document);

  let errors = result.errors();
  assert_eq!(errors.len(), 1, "{:?}", errors);
  assert!(errors[0].contains("confirm-order"));
  assert!(errors[0].contains("process-payment"));

  let diagnostic = result.diagnostics.errors().next().unwrap();
  assert_eq!(diagnostic.code, codes::UNKNOWN_TARGET);
  assert_eq!(diagnostic.step_id.as_deref(), Some("process-payment"));
}

#[test]
fn test_unknown_error_target() {
  let document = ORDER_WORKFLOW.replacen("onError: notify-error", "onError: page-oncall", 1);
  let result = parse(&document);
  assert!(result.errors().iter().any(|e| e.contains("page-oncall")));
}

#[test]
fn test_duplicate_step_ids() {
  let document = ORDER_WORKFLOW.replace("- id: notify-error", "- id: confirm");
  let result = parse(&document);

  let codes_seen: Vec<&str> = result.diagnostics.errors().map(|d| d.code.as_str()).collect();
  assert!(codes_seen.contains(&codes::DUPLICATE_STEP));
  assert!(result.errors().iter().any(|e| e.contains("duplicate step id 'confirm'")));
}

#[test]
fn test_missing_required_fields() {
  let document = r#"
steps:
  - id: a
    action: $.A.run
triggers:
  - on: x
"#;
  let result = parse(document);
  let errors = result.errors();

  assert!(errors.iter().any(|e| e.contains("'id'")));
  assert!(errors.iter().any(|e| e.contains("'kind'")));
  assert!(errors.iter().any(|e| e.contains("'name'")));
  assert!(errors.iter().any(|e| e.contains("'version'")));
  assert_eq!(errors.len(), 4);

  // The partial definition is still returned.
  assert_eq!(result.workflow.steps.len(), 1);
}

#[test]
fn test_zero_steps_is_an_error() {
  let document = r#"
id: empty
kind: Workflow
name: Empty
version: "1"
triggers:
  - on: x
steps: []
"#;
  let result = parse(document);
  let diagnostic = result.diagnostics.errors().next().unwrap();
  assert_eq!(diagnostic.code, codes::NO_STEPS);
}

#[test]
fn test_zero_triggers_is_a_warning() {
  let document = r#"
id: manual
kind: Workflow
name: Manual only
version: "1"
steps:
  - id: a
    action: $.A.run
"#;
  let result = parse(document);
  assert!(result.is_valid());
  assert_eq!(result.warnings().len(), 1);
  assert_eq!(
    result.diagnostics.warnings().next().unwrap().code,
    codes::NO_TRIGGERS
  );
}

#[test]
fn test_parser_does_not_detect_cycles() {
  let document = r#"
id: loop
kind: Workflow
name: Loop
version: "1"
triggers:
  - on: x
steps:
  - id: a
    action: $.A.run
    onSuccess: b
  - id: b
    action: $.B.run
    onSuccess: a
"#;
  assert!(parse(document).is_valid());
}

#[test]
fn test_invalid_field_types() {
  let document = r#"
id: typed
kind: Workflow
name: Typed
version: "1"
triggers: on-order
steps:
  - id: a
    action: $.A.run
    input: [1, 2]
    onSuccess: 7
metadata: nope
"#;
  let result = parse(document);
  let invalid = result
    .diagnostics
    .errors()
    .filter(|d| d.code == codes::INVALID_FIELD)
    .count();
  assert_eq!(invalid, 4, "{:?}", result.errors());
}
