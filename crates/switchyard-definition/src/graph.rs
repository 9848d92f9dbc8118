use std::collections::{HashMap, HashSet, VecDeque};

use crate::step::Step;

/// Which outcome a transition follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
  Success,
  Error,
}

impl std::fmt::Display for Transition {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Transition::Success => f.write_str("onSuccess"),
      Transition::Error => f.write_str("onError"),
    }
  }
}

/// Step transition graph for traversal and analysis.
///
/// Nodes are step ids in definition order. Transitions whose target is not a
/// known step are dropped, so the graph is safe to build from any definition.
#[derive(Debug, Clone)]
pub struct TransitionGraph {
  /// Step ids in definition order.
  order: Vec<String>,
  /// Adjacency list: step_id -> outgoing (transition, target) pairs,
  /// onSuccess before onError.
  adjacency: HashMap<String, Vec<(Transition, String)>>,
  /// Reverse adjacency: step_id -> steps that transition into it.
  reverse_adjacency: HashMap<String, Vec<String>>,
}

impl TransitionGraph {
  /// Build a graph from steps.
  pub fn new(steps: &[Step]) -> Self {
    let mut adjacency: HashMap<String, Vec<(Transition, String)>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut order = Vec::with_capacity(steps.len());

    for step in steps {
      if adjacency.contains_key(&step.id) {
        continue;
      }
      adjacency.insert(step.id.clone(), Vec::new());
      reverse_adjacency.insert(step.id.clone(), Vec::new());
      order.push(step.id.clone());
    }

    for step in steps {
      let edges = [
        (Transition::Success, step.on_success.as_ref()),
        (Transition::Error, step.on_error.as_ref()),
      ];
      for (transition, target) in edges {
        let Some(target) = target else { continue };
        if !reverse_adjacency.contains_key(target) {
          continue;
        }
        if let Some(out) = adjacency.get_mut(&step.id) {
          out.push((transition, target.clone()));
        }
        if let Some(incoming) = reverse_adjacency.get_mut(target) {
          incoming.push(step.id.clone());
        }
      }
    }

    Self {
      order,
      adjacency,
      reverse_adjacency,
    }
  }

  /// Step ids in definition order.
  pub fn steps(&self) -> &[String] {
    &self.order
  }

  /// The entry step, if the workflow has any steps.
  pub fn entry(&self) -> Option<&str> {
    self.order.first().map(|s| s.as_str())
  }

  /// Outgoing transitions of a step.
  pub fn transitions(&self, step_id: &str) -> &[(Transition, String)] {
    self
      .adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Steps reachable in one transition.
  pub fn downstream(&self, step_id: &str) -> impl Iterator<Item = &str> {
    self.transitions(step_id).iter().map(|(_, t)| t.as_str())
  }

  /// Steps that transition into the given step.
  pub fn upstream(&self, step_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Steps reachable from the entry step, including the entry itself.
  pub fn reachable(&self) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let Some(entry) = self.entry() else {
      return reachable;
    };

    let mut queue = VecDeque::from([entry.to_string()]);
    reachable.insert(entry.to_string());
    while let Some(step_id) = queue.pop_front() {
      for next in self.downstream(&step_id) {
        if reachable.insert(next.to_string()) {
          queue.push_back(next.to_string());
        }
      }
    }
    reachable
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn steps() -> Vec<Step> {
    vec![
      Step::new("a", "x").on_success("b").on_error("c"),
      Step::new("b", "x").on_success("c"),
      Step::new("c", "x"),
      Step::new("orphan", "x").on_success("a"),
    ]
  }

  #[test]
  fn test_transitions_keep_success_before_error() {
    let graph = TransitionGraph::new(&steps());
    assert_eq!(
      graph.transitions("a"),
      &[
        (Transition::Success, "b".to_string()),
        (Transition::Error, "c".to_string())
      ]
    );
    assert_eq!(graph.entry(), Some("a"));
  }

  #[test]
  fn test_upstream() {
    let graph = TransitionGraph::new(&steps());
    assert_eq!(graph.upstream("c"), &["a".to_string(), "b".to_string()]);
    assert_eq!(graph.upstream("a"), &["orphan".to_string()]);
    assert!(graph.upstream("orphan").is_empty());
  }

  #[test]
  fn test_reachable_from_entry() {
    let graph = TransitionGraph::new(&steps());
    let reachable = graph.reachable();
    assert!(reachable.contains("a"));
    assert!(reachable.contains("c"));
    assert!(!reachable.contains("orphan"));
  }

  #[test]
  fn test_dangling_targets_are_dropped() {
    let graph = TransitionGraph::new(&[Step::new("a", "x").on_success("missing")]);
    assert!(graph.transitions("a").is_empty());
    assert!(graph.upstream("missing").is_empty());
  }

  #[test]
  fn test_empty_graph() {
    let graph = TransitionGraph::new(&[]);
    assert_eq!(graph.entry(), None);
    assert!(graph.reachable().is_empty());
  }
}
