//! Dependency graph over `requires` edges.
//!
//! An edge `a -> b` exists when `b` appears in `a`'s `requires` list. The
//! resolution engines need this graph to be acyclic; [`detect_requires_cycles`]
//! reports every cycle so a malformed spec can be diagnosed in one pass.

use std::collections::{BTreeMap, HashSet};

/// Field name paired with its `requires` list, in declared order.
pub type RequiresEdges<'a> = &'a [(String, Vec<String>)];

/// Find cycles in the `requires` graph.
///
/// Runs a depth-first search from every field in declared order, keeping the
/// current path as a recursion stack. Revisiting a node on the stack yields
/// the path slice from that node's first occurrence as one cycle. Returns an
/// empty list for an acyclic graph. Names without a declaration are treated as
/// leaves.
pub fn detect_requires_cycles(fields: RequiresEdges<'_>) -> Vec<Vec<String>> {
    let adjacency: BTreeMap<&str, &[String]> = fields
        .iter()
        .map(|(name, requires)| (name.as_str(), requires.as_slice()))
        .collect();

    let mut visited = HashSet::new();
    let mut path: Vec<&str> = Vec::new();
    let mut cycles = Vec::new();
    for (name, _) in fields {
        visit(name, &adjacency, &mut visited, &mut path, &mut cycles);
    }
    cycles
}

fn visit<'a>(
    node: &'a str,
    adjacency: &BTreeMap<&'a str, &'a [String]>,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    if let Some(start) = path.iter().position(|on_stack| *on_stack == node) {
        cycles.push(path[start..].iter().map(|s| s.to_string()).collect());
        return;
    }
    if !visited.insert(node) {
        return;
    }

    path.push(node);
    for neighbor in adjacency.get(node).copied().unwrap_or_default() {
        visit(neighbor, adjacency, visited, path, cycles);
    }
    path.pop();
}

/// Render cycles for diagnostics: `a -> b -> a; c -> c`.
pub fn describe_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| {
            let mut nodes = cycle.clone();
            if let Some(first) = cycle.first() {
                nodes.push(first.clone());
            }
            nodes.join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Order fields so every field comes after everything it requires.
///
/// Among the fields that are ready at each point, the one declared first wins,
/// so an already-topological declaration order is returned unchanged. Returns
/// `None` if the graph has a cycle.
pub fn toposort_fields(fields: RequiresEdges<'_>) -> Option<Vec<String>> {
    let declared: HashSet<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(fields.len());

    while order.len() < fields.len() {
        let next = fields.iter().find(|(name, requires)| {
            !placed.contains(name.as_str())
                && requires
                    .iter()
                    .all(|dep| placed.contains(dep.as_str()) || !declared.contains(dep.as_str()))
        })?;
        placed.insert(next.0.as_str());
        order.push(next.0.clone());
    }
    Some(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(spec: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        spec.iter()
            .map(|(name, requires)| {
                (
                    name.to_string(),
                    requires.iter().map(|r| r.to_string()).collect(),
                )
            })
            .collect()
    }

    fn sorted(cycle: &[String]) -> Vec<String> {
        let mut members = cycle.to_vec();
        members.sort();
        members
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let graph = edges(&[("a", &[]), ("b", &["a"]), ("c", &["a", "b"])]);
        assert!(detect_requires_cycles(&graph).is_empty());
    }

    #[test]
    fn empty_graph_has_no_cycles() {
        assert!(detect_requires_cycles(&[]).is_empty());
    }

    #[test]
    fn two_node_cycle_reported_once() {
        let graph = edges(&[("a", &["b"]), ("b", &["a"])]);
        let cycles = detect_requires_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(sorted(&cycles[0]), vec!["a", "b"]);
    }

    #[test]
    fn three_node_cycle_reported_once() {
        let graph = edges(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);
        let cycles = detect_requires_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(sorted(&cycles[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn separate_cycles_are_all_reported() {
        let graph = edges(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("c", &["d"]),
            ("d", &["c"]),
        ]);
        let cycles = detect_requires_cycles(&graph);
        assert_eq!(cycles.len(), 2);
        let members: Vec<Vec<String>> = cycles.iter().map(|c| sorted(c)).collect();
        assert!(members.contains(&vec!["a".to_string(), "b".to_string()]));
        assert!(members.contains(&vec!["c".to_string(), "d".to_string()]));
    }

    /// Only the participating nodes are reported, not the acyclic prefix.
    #[test]
    fn cycle_nested_in_acyclic_structure() {
        let graph = edges(&[
            ("root", &[]),
            ("entry", &["root", "x"]),
            ("x", &["z"]),
            ("y", &["x"]),
            ("z", &["y"]),
            ("leaf", &["entry"]),
        ]);
        let cycles = detect_requires_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(sorted(&cycles[0]), vec!["x", "y", "z"]);
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let graph = edges(&[("a", &["a"])]);
        assert_eq!(detect_requires_cycles(&graph), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn describe_closes_each_cycle() {
        let cycles = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ];
        assert_eq!(describe_cycles(&cycles), "a -> b -> a; c -> c");
    }

    #[test]
    fn toposort_keeps_topological_declaration_order() {
        let graph = edges(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
        assert_eq!(
            toposort_fields(&graph).expect("acyclic"),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn toposort_moves_dependents_after_dependencies() {
        let graph = edges(&[("arrival", &["departure"]), ("departure", &[]), ("other", &[])]);
        assert_eq!(
            toposort_fields(&graph).expect("acyclic"),
            vec!["departure", "arrival", "other"]
        );
    }

    #[test]
    fn toposort_rejects_cycles() {
        let graph = edges(&[("a", &["b"]), ("b", &["a"])]);
        assert!(toposort_fields(&graph).is_none());
    }
}
