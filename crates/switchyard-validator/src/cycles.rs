use std::collections::{HashMap, HashSet};

use switchyard_definition::TransitionGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
  Unvisited,
  OnStack,
  Done,
}

/// Find cycles in a transition graph using DFS with an explicit path stack.
///
/// Each cycle is returned as the path that closes it, starting and ending at
/// the same step (`["a", "b", "a"]`). Steps are visited in definition order
/// and onSuccess before onError, so the result is deterministic.
pub fn find_cycles(graph: &TransitionGraph) -> Vec<Vec<String>> {
  let mut marks: HashMap<&str, Mark> = graph
    .steps()
    .iter()
    .map(|id| (id.as_str(), Mark::Unvisited))
    .collect();
  let mut cycles = Vec::new();
  let mut seen = HashSet::new();

  for root in graph.steps() {
    if marks.get(root.as_str()) != Some(&Mark::Unvisited) {
      continue;
    }

    // Frames are (step, index of the next outgoing edge to follow); `path`
    // mirrors the steps currently on the frame stack.
    let mut frames: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
    let mut path: Vec<&str> = vec![root.as_str()];
    marks.insert(root.as_str(), Mark::OnStack);

    while let Some(frame) = frames.last_mut() {
      let (step, edge) = *frame;
      let Some(next) = graph.downstream(step).nth(edge) else {
        frames.pop();
        path.pop();
        marks.insert(step, Mark::Done);
        continue;
      };
      frame.1 += 1;

      match marks.get(next).copied() {
        // Back edge = cycle
        Some(Mark::OnStack) => {
          let start = path.iter().position(|s| *s == next).unwrap_or(0);
          let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
          cycle.push(next.to_string());
          if seen.insert(cycle.clone()) {
            cycles.push(cycle);
          }
        }
        Some(Mark::Unvisited) => {
          marks.insert(next, Mark::OnStack);
          frames.push((next, 0));
          path.push(next);
        }
        _ => {}
      }
    }
  }

  cycles
}

#[cfg(test)]
mod tests {
  use super::*;
  use switchyard_definition::Step;

  fn cycles_of(steps: Vec<Step>) -> Vec<Vec<String>> {
    find_cycles(&TransitionGraph::new(&steps))
  }

  #[test]
  fn test_acyclic() {
    let cycles = cycles_of(vec![
      Step::new("a", "x").on_success("b").on_error("c"),
      Step::new("b", "x").on_success("c"),
      Step::new("c", "x"),
    ]);
    assert!(cycles.is_empty());
  }

  #[test]
  fn test_two_step_cycle() {
    let cycles = cycles_of(vec![
      Step::new("a", "x").on_success("b"),
      Step::new("b", "x").on_success("a"),
    ]);
    assert_eq!(cycles, vec![vec!["a", "b", "a"]]);
  }

  #[test]
  fn test_self_loop() {
    let cycles = cycles_of(vec![Step::new("retry", "x").on_error("retry")]);
    assert_eq!(cycles, vec![vec!["retry", "retry"]]);
  }

  #[test]
  fn test_cycle_through_error_edge() {
    let cycles = cycles_of(vec![
      Step::new("a", "x").on_success("b"),
      Step::new("b", "x").on_success("c").on_error("a"),
      Step::new("c", "x"),
    ]);
    assert_eq!(cycles, vec![vec!["a", "b", "a"]]);
  }

  #[test]
  fn test_cycle_not_containing_entry() {
    let cycles = cycles_of(vec![
      Step::new("a", "x").on_success("b"),
      Step::new("b", "x").on_success("c"),
      Step::new("c", "x").on_success("b"),
    ]);
    assert_eq!(cycles, vec![vec!["b", "c", "b"]]);
  }

  #[test]
  fn test_same_cycle_via_both_edges_reported_once() {
    let cycles = cycles_of(vec![
      Step::new("a", "x").on_success("b"),
      Step::new("b", "x").on_success("a").on_error("a"),
    ]);
    assert_eq!(cycles.len(), 1);
  }

  #[test]
  fn test_long_chain_does_not_exhaust_stack() {
    let n = 20_000;
    let mut steps: Vec<Step> = (0..n - 1)
      .map(|i| Step::new(format!("s{i}"), "x").on_success(format!("s{}", i + 1)))
      .collect();
    steps.push(Step::new(format!("s{}", n - 1), "x").on_success("s0"));

    let cycles = cycles_of(steps);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), n + 1);
    assert_eq!(cycles[0].first(), cycles[0].last());
  }
}
