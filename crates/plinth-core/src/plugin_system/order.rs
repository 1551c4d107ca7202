//! Deterministic topological sequencing of the surviving graph.
//!
//! Kahn's algorithm, peeling zero-remaining-dependency nodes through a
//! priority heap keyed by `(weight, name)` instead of an arbitrary queue:
//! for every edge `A -> B`, `B` precedes `A`, and mutually independent
//! plugins come out in ascending weight, then ascending name. Re-running on
//! the same input always yields the same order, which reproducible boot
//! behavior and the test suite both rely on.
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::graph::DependencyGraph;

/// Produce the activation order for a cycle-free graph.
///
/// `weights` carries the descriptor weight per surviving node; absent
/// entries default to 0. Call only after cycle detection: if peeling stalls
/// (a cycle slipped through), the leftover nodes are reported as a
/// [`DependencyError::CyclicDependency`] rather than a partial order.
pub fn sequence(
    graph: &DependencyGraph,
    weights: &HashMap<String, i64>,
) -> Result<Vec<String>, DependencyError> {
    let weight_of = |name: &str| weights.get(name).copied().unwrap_or(0);

    let mut remaining: HashMap<&str, usize> = graph
        .nodes()
        .iter()
        .map(|n| (n.as_str(), graph.requires(n).len()))
        .collect();

    let mut ready: BinaryHeap<Reverse<(i64, &str)>> = graph
        .nodes()
        .iter()
        .filter(|n| graph.requires(n).is_empty())
        .map(|n| Reverse((weight_of(n), n.as_str())))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(Reverse((_, node))) = ready.pop() {
        order.push(node.to_string());

        for dependent in graph.dependents(node) {
            if let Some(count) = remaining.get_mut(dependent.as_str()) {
                *count -= 1;
                if *count == 0 {
                    ready.push(Reverse((weight_of(dependent), dependent.as_str())));
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        // Peeling stalled: every unordered node sits on or behind a cycle.
        let leftover: Vec<String> = graph
            .nodes()
            .iter()
            .filter(|n| !order.contains(n))
            .cloned()
            .collect();
        Err(DependencyError::CyclicDependency(leftover))
    }
}
