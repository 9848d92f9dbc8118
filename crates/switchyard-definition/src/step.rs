use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::input::InputValue;

/// A unit of work: one action plus its success and error transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
  pub id: String,
  /// Opaque action identifier, e.g. `$.Email.send`. Resolved by the service
  /// proxy at execution time.
  pub action: String,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub input: BTreeMap<String, InputValue>,
  /// Next step after success. `None` terminates successfully.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_success: Option<String>,
  /// Next step after failure. `None` terminates with the failure.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_error: Option<String>,
}

impl Step {
  /// Create a step with no input and no transitions.
  pub fn new(id: impl Into<String>, action: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      action: action.into(),
      input: BTreeMap::new(),
      on_success: None,
      on_error: None,
    }
  }

  pub fn with_input(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
    self.input.insert(key.into(), value.into());
    self
  }

  pub fn on_success(mut self, target: impl Into<String>) -> Self {
    self.on_success = Some(target.into());
    self
  }

  pub fn on_error(mut self, target: impl Into<String>) -> Self {
    self.on_error = Some(target.into());
    self
  }

  /// The step input as a JSON object with keys in sorted order.
  pub fn input_json(&self) -> serde_json::Value {
    serde_json::Value::Object(
      self
        .input
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect(),
    )
  }
}
