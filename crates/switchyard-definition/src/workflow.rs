use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::TransitionGraph;
use crate::step::Step;
use crate::trigger::Trigger;

/// Value of the document discriminator that marks a workflow.
pub const WORKFLOW_KIND: &str = "Workflow";

/// A parsed workflow definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub version: String,
  #[serde(default)]
  pub triggers: Vec<Trigger>,
  /// Steps in document order. The first step is the entry point.
  #[serde(default)]
  pub steps: Vec<Step>,
  /// Free-form metadata, opaque to every stage.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, serde_json::Value>,
}

impl WorkflowDefinition {
  /// Build the transition graph for traversal.
  pub fn graph(&self) -> TransitionGraph {
    TransitionGraph::new(&self.steps)
  }

  /// Get a step by ID.
  pub fn get_step(&self, step_id: &str) -> Option<&Step> {
    self.steps.iter().find(|s| s.id == step_id)
  }

  /// The step execution starts from.
  pub fn first_step(&self) -> Option<&Step> {
    self.steps.first()
  }
}
