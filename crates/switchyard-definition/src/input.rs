//! Step input values.
//!
//! A step input is either a literal JSON value or a template string that is
//! rendered at execution time against the workflow context.
//!
//! # Examples
//!
//! ```yaml
//! input:
//!   orderId: "{{ event.orderId }}"
//!   retries: 3
//!   channel: email
//! ```
//!
//! `orderId` is a [`InputValue::Template`]; `retries` and `channel` are
//! [`InputValue::Literal`]s. Nothing in this crate evaluates templates.

use serde::{Deserialize, Serialize};

/// Marker that turns a string input into a template.
const TEMPLATE_OPEN: &str = "{{";

/// A single step input value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum InputValue {
  /// A value passed through unchanged.
  Literal(serde_json::Value),
  /// A placeholder expression such as `{{ context.orderId }}`.
  Template(String),
}

impl InputValue {
  /// Returns true if this value is a template placeholder.
  pub fn is_template(&self) -> bool {
    matches!(self, InputValue::Template(_))
  }

  /// The value as it appears in the source document.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      InputValue::Literal(value) => value.clone(),
      InputValue::Template(template) => serde_json::Value::String(template.clone()),
    }
  }
}

impl From<serde_json::Value> for InputValue {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::String(s) if s.contains(TEMPLATE_OPEN) => InputValue::Template(s),
      other => InputValue::Literal(other),
    }
  }
}

impl From<InputValue> for serde_json::Value {
  fn from(value: InputValue) -> Self {
    match value {
      InputValue::Literal(value) => value,
      InputValue::Template(template) => serde_json::Value::String(template),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_strings_with_placeholders_are_templates() {
    let value = InputValue::from(json!("{{ event.orderId }}"));
    assert!(value.is_template());

    let value = InputValue::from(json!("plain"));
    assert_eq!(value, InputValue::Literal(json!("plain")));
  }

  #[test]
  fn test_non_strings_are_literals() {
    assert_eq!(InputValue::from(json!(3)), InputValue::Literal(json!(3)));
    assert_eq!(
      InputValue::from(json!({"a": "{{ x }}"})),
      InputValue::Literal(json!({"a": "{{ x }}"}))
    );
  }

  #[test]
  fn test_serializes_as_source_value() {
    let value = InputValue::Template("{{ a }}".to_string());
    assert_eq!(serde_json::to_value(&value).unwrap(), json!("{{ a }}"));

    let back: InputValue = serde_json::from_value(json!("{{ a }}")).unwrap();
    assert_eq!(back, value);
  }
}
