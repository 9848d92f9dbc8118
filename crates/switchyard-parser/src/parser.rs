use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use switchyard_definition::{
  Diagnostic, Diagnostics, InputValue, Step, Trigger, WORKFLOW_KIND, WorkflowDefinition,
};
use tracing::debug;

use crate::ParseResult;
use crate::codes;

const WORKFLOW_FIELDS: &[&str] = &[
  "id",
  "kind",
  "$type",
  "name",
  "description",
  "version",
  "triggers",
  "steps",
  "metadata",
];

const STEP_FIELDS: &[&str] = &["id", "action", "input", "onSuccess", "onError"];

/// Parse a workflow document.
///
/// Never fails: every problem is reported as a diagnostic on the result.
pub fn parse(document: &str) -> ParseResult {
  let root: Value = match serde_yaml::from_str(document) {
    Ok(root) => root,
    Err(e) => {
      debug!(error = %e, "workflow document unreadable");
      return ParseResult {
        workflow: WorkflowDefinition::default(),
        diagnostics: Diagnostics::from(vec![Diagnostic::error(
          codes::UNREADABLE,
          format!("unreadable workflow document: {}", e),
        )]),
      };
    }
  };

  let mut parser = DocumentParser::default();
  let workflow = parser.parse_workflow(&root);

  debug!(
    workflow_id = %workflow.id,
    steps = workflow.steps.len(),
    triggers = workflow.triggers.len(),
    errors = parser.diagnostics.errors().count(),
    warnings = parser.diagnostics.warnings().count(),
    "workflow document parsed"
  );

  ParseResult {
    workflow,
    diagnostics: parser.diagnostics,
  }
}

/// Walks a document tree and collects diagnostics.
#[derive(Default)]
struct DocumentParser {
  diagnostics: Diagnostics,
}

impl DocumentParser {
  fn error(&mut self, code: &str, message: String) {
    self.diagnostics.push(Diagnostic::error(code, message));
  }

  fn warning(&mut self, code: &str, message: String) {
    self.diagnostics.push(Diagnostic::warning(code, message));
  }

  fn parse_workflow(&mut self, root: &Value) -> WorkflowDefinition {
    let Some(doc) = root.as_object() else {
      let found = if root.is_null() {
        "an empty document"
      } else {
        type_name(root)
      };
      self.error(
        codes::NOT_A_MAPPING,
        format!("workflow document must be a mapping, found {}", found),
      );
      return WorkflowDefinition::default();
    };

    for key in doc.keys() {
      if !WORKFLOW_FIELDS.contains(&key.as_str()) {
        self.warning(
          codes::UNKNOWN_FIELD,
          format!("unknown field '{}' ignored", key),
        );
      }
    }

    let id = self.required_string(doc, "id", "workflow");
    self.check_kind(doc);
    let name = self.required_string(doc, "name", "workflow");
    let version = self.required_version(doc);
    let description = self.optional_string(doc, "description", "workflow");
    let triggers = self.parse_triggers(doc.get("triggers"));
    let steps = self.parse_steps(doc.get("steps"));
    let metadata = self.parse_metadata(doc.get("metadata"));

    self.check_unique_ids(&steps);
    self.check_transitions(&steps);

    WorkflowDefinition {
      id,
      name,
      description,
      version,
      triggers,
      steps,
      metadata,
    }
  }

  fn check_kind(&mut self, doc: &Map<String, Value>) {
    let (field, kind) = match (doc.get("kind"), doc.get("$type")) {
      (Some(kind), _) => ("kind", kind),
      (None, Some(kind)) => ("$type", kind),
      (None, None) => {
        self.error(
          codes::MISSING_FIELD,
          format!(
            "missing required field 'kind' (expected '{}')",
            WORKFLOW_KIND
          ),
        );
        return;
      }
    };

    match kind {
      Value::String(kind) if kind == WORKFLOW_KIND => {}
      Value::String(kind) => self.error(
        codes::WRONG_KIND,
        format!(
          "document {} is '{}', expected '{}'",
          field, kind, WORKFLOW_KIND
        ),
      ),
      other => self.error(
        codes::INVALID_FIELD,
        format!("field '{}' must be a string, found {}", field, type_name(other)),
      ),
    }
  }

  /// A required, non-empty string field. Returns an empty string if absent.
  fn required_string(&mut self, map: &Map<String, Value>, field: &str, owner: &str) -> String {
    match map.get(field) {
      Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
      Some(Value::String(_)) => {
        self.error(
          codes::MISSING_FIELD,
          format!("{} field '{}' must not be empty", owner, field),
        );
        String::new()
      }
      None | Some(Value::Null) => {
        self.error(
          codes::MISSING_FIELD,
          format!("{} is missing required field '{}'", owner, field),
        );
        String::new()
      }
      Some(other) => {
        self.error(
          codes::INVALID_FIELD,
          format!(
            "{} field '{}' must be a string, found {}",
            owner,
            field,
            type_name(other)
          ),
        );
        String::new()
      }
    }
  }

  /// Versions are strings, but `version: 1.2` arrives as a number.
  fn required_version(&mut self, doc: &Map<String, Value>) -> String {
    match doc.get("version") {
      Some(Value::Number(n)) => n.to_string(),
      _ => self.required_string(doc, "version", "workflow"),
    }
  }

  fn optional_string(
    &mut self,
    map: &Map<String, Value>,
    field: &str,
    owner: &str,
  ) -> Option<String> {
    match map.get(field) {
      None | Some(Value::Null) => None,
      Some(Value::String(s)) => Some(s.clone()),
      Some(other) => {
        self.error(
          codes::INVALID_FIELD,
          format!(
            "{} field '{}' must be a string, found {}",
            owner,
            field,
            type_name(other)
          ),
        );
        None
      }
    }
  }

  fn parse_triggers(&mut self, value: Option<&Value>) -> Vec<Trigger> {
    let items: &[Value] = match value {
      None | Some(Value::Null) => &[],
      Some(Value::Array(items)) => items,
      Some(other) => {
        self.error(
          codes::INVALID_FIELD,
          format!("field 'triggers' must be a list, found {}", type_name(other)),
        );
        return Vec::new();
      }
    };

    if items.is_empty() {
      self.warning(
        codes::NO_TRIGGERS,
        "workflow declares no triggers; it can only be started programmatically".to_string(),
      );
      return Vec::new();
    }

    items
      .iter()
      .enumerate()
      .filter_map(|(index, item)| self.parse_trigger(index, item))
      .collect()
  }

  fn parse_trigger(&mut self, index: usize, item: &Value) -> Option<Trigger> {
    let Some(map) = item.as_object() else {
      self.error(
        codes::INVALID_TRIGGER,
        format!("trigger #{} must be a mapping, found {}", index + 1, type_name(item)),
      );
      return None;
    };

    let trigger = match (map.get("on"), map.get("every")) {
      (Some(on), None) => non_empty_str(on).map(Trigger::event),
      (None, Some(every)) => non_empty_str(every).map(Trigger::schedule),
      (Some(_), Some(_)) => {
        self.error(
          codes::INVALID_TRIGGER,
          format!(
            "trigger #{} declares both 'on' and 'every'; use one per trigger",
            index + 1
          ),
        );
        return None;
      }
      (None, None) => {
        self.error(
          codes::INVALID_TRIGGER,
          format!(
            "trigger #{} must declare either 'on' (event) or 'every' (schedule)",
            index + 1
          ),
        );
        return None;
      }
    };

    if trigger.is_none() {
      self.error(
        codes::INVALID_TRIGGER,
        format!("trigger #{} must name a non-empty event or schedule", index + 1),
      );
    }
    trigger
  }

  fn parse_steps(&mut self, value: Option<&Value>) -> Vec<Step> {
    let items = match value {
      None | Some(Value::Null) => {
        self.error(
          codes::NO_STEPS,
          "workflow must declare at least one step".to_string(),
        );
        return Vec::new();
      }
      Some(Value::Array(items)) => items,
      Some(other) => {
        self.error(
          codes::INVALID_FIELD,
          format!("field 'steps' must be a list, found {}", type_name(other)),
        );
        return Vec::new();
      }
    };

    if items.is_empty() {
      self.error(
        codes::NO_STEPS,
        "workflow must declare at least one step".to_string(),
      );
      return Vec::new();
    }

    items
      .iter()
      .enumerate()
      .filter_map(|(index, item)| self.parse_step(index, item))
      .collect()
  }

  fn parse_step(&mut self, index: usize, item: &Value) -> Option<Step> {
    let owner = format!("step #{}", index + 1);
    let Some(map) = item.as_object() else {
      self.error(
        codes::INVALID_FIELD,
        format!("{} must be a mapping, found {}", owner, type_name(item)),
      );
      return None;
    };

    let id = self.required_string(map, "id", &owner);
    if id.is_empty() {
      return None;
    }
    let owner = format!("step '{}'", id);

    for key in map.keys() {
      if !STEP_FIELDS.contains(&key.as_str()) {
        self.diagnostics.push(
          Diagnostic::warning(
            codes::UNKNOWN_FIELD,
            format!("{} has unknown field '{}' (ignored)", owner, key),
          )
          .for_step(&id),
        );
      }
    }

    let action = self.required_string(map, "action", &owner);
    let input = self.parse_input(map.get("input"), &owner);
    let on_success = self.optional_string(map, "onSuccess", &owner);
    let on_error = self.optional_string(map, "onError", &owner);

    Some(Step {
      id,
      action,
      input,
      on_success,
      on_error,
    })
  }

  fn parse_input(&mut self, value: Option<&Value>, owner: &str) -> BTreeMap<String, InputValue> {
    match value {
      None | Some(Value::Null) => BTreeMap::new(),
      Some(Value::Object(map)) => map
        .iter()
        .map(|(k, v)| (k.clone(), InputValue::from(v.clone())))
        .collect(),
      Some(other) => {
        self.error(
          codes::INVALID_FIELD,
          format!(
            "{} field 'input' must be a mapping, found {}",
            owner,
            type_name(other)
          ),
        );
        BTreeMap::new()
      }
    }
  }

  fn parse_metadata(&mut self, value: Option<&Value>) -> BTreeMap<String, Value> {
    match value {
      None | Some(Value::Null) => BTreeMap::new(),
      Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
      Some(other) => {
        self.error(
          codes::INVALID_FIELD,
          format!(
            "field 'metadata' must be a mapping, found {}",
            type_name(other)
          ),
        );
        BTreeMap::new()
      }
    }
  }

  fn check_unique_ids(&mut self, steps: &[Step]) {
    let mut seen = HashSet::new();
    for step in steps {
      if !seen.insert(step.id.as_str()) {
        self.diagnostics.push(
          Diagnostic::error(
            codes::DUPLICATE_STEP,
            format!("duplicate step id '{}'", step.id),
          )
          .for_step(&step.id),
        );
      }
    }
  }

  fn check_transitions(&mut self, steps: &[Step]) {
    let ids: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();
    for step in steps {
      let transitions = [
        ("onSuccess", step.on_success.as_deref()),
        ("onError", step.on_error.as_deref()),
      ];
      for (field, target) in transitions {
        let Some(target) = target else { continue };
        if !ids.contains(target) {
          self.diagnostics.push(
            Diagnostic::error(
              codes::UNKNOWN_TARGET,
              format!(
                "step '{}' {} references unknown step '{}'",
                step.id, field, target
              ),
            )
            .for_step(&step.id),
          );
        }
      }
    }
  }
}

fn non_empty_str(value: &Value) -> Option<String> {
  value
    .as_str()
    .filter(|s| !s.trim().is_empty())
    .map(str::to_string)
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "a list",
    Value::Object(_) => "a mapping",
  }
}
