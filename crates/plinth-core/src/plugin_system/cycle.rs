//! Cycle detection over the surviving dependency graph.
//!
//! Three-color depth-first search: white (unvisited), gray (on the current
//! traversal stack), black (fully processed). Visiting a gray node closes a
//! cycle. The traversal uses an explicit frame stack, so adversarially deep
//! dependency chains cannot exhaust the call stack. Roots are picked in
//! admission order, so which cycle gets reported is reproducible for
//! identical input.
use std::collections::HashMap;

use crate::plugin_system::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Searches the graph for a dependency cycle.
///
/// Returns the full loop as an ordered path, from the point the revisited
/// node first entered the stack through to the revisit, inclusive — e.g.
/// `["a", "b", "a"]` — so diagnostics show every participant, not just the
/// endpoints. A self-dependency yields the one-node cycle `["a", "a"]`.
/// Returns `None` when the graph is acyclic.
pub fn find_cycle(graph: &DependencyGraph) -> Option<Vec<String>> {
    let mut color: HashMap<&str, Color> = graph
        .nodes()
        .iter()
        .map(|n| (n.as_str(), Color::White))
        .collect();

    for root in graph.nodes() {
        if color.get(root.as_str()).copied() != Some(Color::White) {
            continue;
        }

        // Explicit DFS stack of (node, next-child-index) frames.
        let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
        color.insert(root.as_str(), Color::Gray);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let deps = graph.requires(node);

            if frame.1 >= deps.len() {
                color.insert(node, Color::Black);
                stack.pop();
                continue;
            }

            let next = deps[frame.1].as_str();
            frame.1 += 1;

            match color.get(next).copied().unwrap_or(Color::Black) {
                Color::White => {
                    color.insert(next, Color::Gray);
                    stack.push((next, 0));
                }
                Color::Gray => {
                    // `next` is on the stack: the slice from its first
                    // occurrence to the top is the loop.
                    let start = stack
                        .iter()
                        .position(|(n, _)| *n == next)
                        .unwrap_or(stack.len() - 1);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|(n, _)| (*n).to_string()).collect();
                    path.push(next.to_string());
                    return Some(path);
                }
                Color::Black => {}
            }
        }
    }

    None
}
