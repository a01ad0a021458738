//! A generic dependency graph with topological sort and cycle-path
//! reconstruction, instantiated twice by [`crate::build`]: once for
//! creation order (an entry's constructor arguments must already
//! exist) and once for registration order (an entry's registration
//! target must already exist).

use std::collections::{HashMap, HashSet};

pub struct CycleError {
    pub path: Vec<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Returns `nodes` reordered so that every edge `a -> b` (meaning "a
/// depends on b") has `b` appear before `a`. `edges(name)` yields the
/// names `name` depends on; names outside `nodes` (e.g. host builtins)
/// are ignored.
pub fn topo_sort(
    nodes: &[String],
    edges: impl Fn(&str) -> Vec<String>,
) -> Result<Vec<String>, CycleError> {
    let node_set: HashSet<String> = nodes.iter().cloned().collect();
    let mut marks: HashMap<String, Mark> =
        nodes.iter().map(|n| (n.clone(), Mark::Unvisited)).collect();
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<String> = Vec::new();

    for name in nodes {
        visit(name, &node_set, &edges, &mut marks, &mut order, &mut stack)?;
    }

    Ok(order)
}

fn visit(
    name: &str,
    node_set: &HashSet<String>,
    edges: &impl Fn(&str) -> Vec<String>,
    marks: &mut HashMap<String, Mark>,
    order: &mut Vec<String>,
    stack: &mut Vec<String>,
) -> Result<(), CycleError> {
    match marks.get(name) {
        Some(Mark::Done) | None => return Ok(()),
        Some(Mark::InProgress) => {
            let start = stack.iter().position(|s| s == name).unwrap_or(0);
            let mut path: Vec<String> = stack[start..].to_vec();
            path.push(name.to_string());
            return Err(CycleError { path });
        }
        Some(Mark::Unvisited) => {}
    }

    marks.insert(name.to_string(), Mark::InProgress);
    stack.push(name.to_string());

    for dep in edges(name) {
        if node_set.contains(&dep) {
            visit(&dep, node_set, edges, marks, order, stack)?;
        }
    }

    stack.pop();
    marks.insert(name.to_string(), Mark::Done);
    order.push(name.to_string());
    Ok(())
}
