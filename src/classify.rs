//! Utility classifiers and default-value filling

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::ast::{Ast, NodeId, NodeKind};
use crate::grammar::registry;
use crate::grammar::{ArgType, Frequency};

/// True when every utility in the tree is a high-frequency one.
pub fn is_simple(ast: &Ast) -> bool {
    utility_nodes(ast, ast.root())
        .into_iter()
        .all(|id| registry::is_high_frequency(&ast.node(id).value))
}

/// True when any utility in the tree falls in a mid/low-frequency band.
pub fn is_low_frequency(ast: &Ast) -> bool {
    utility_nodes(ast, ast.root())
        .into_iter()
        .any(|id| registry::is_low_frequency(&ast.node(id).value))
}

/// Names of all utilities under `node`.
pub fn get_utilities(ast: &Ast, node: NodeId) -> BTreeSet<String> {
    utility_nodes(ast, node)
        .into_iter()
        .map(|id| ast.node(id).value.clone())
        .collect()
}

/// Utilities grouped by frequency band, in band order. Every band is
/// present, possibly empty.
pub fn categorize_utilities(ast: &Ast) -> IndexMap<&'static str, BTreeSet<String>> {
    let mut categories: IndexMap<&'static str, BTreeSet<String>> = Frequency::ALL
        .iter()
        .map(|f| (f.as_str(), BTreeSet::new()))
        .collect();
    for name in get_utilities(ast, ast.root()) {
        let band = registry::frequency(&name).as_str();
        if let Some(set) = categories.get_mut(band) {
            set.insert(name);
        }
    }
    categories
}

/// Utility nodes reachable from `id` without descending into arguments.
fn utility_nodes(ast: &Ast, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let node = ast.node(current);
        if node.is_argument() {
            continue;
        }
        if node.is_utility() {
            out.push(current);
        }
        stack.extend(node.children().iter().rev().copied());
    }
    out
}

/// Replace placeholder argument values under `node` with a usable literal.
/// Arguments holding real values are left alone, so filling twice is the
/// same as filling once.
pub fn fill_default_value(ast: &mut Ast, node: NodeId) {
    for id in ast.descendants(node) {
        if let Some(value) = default_value(ast, id) {
            tracing::trace!(from = %ast.node(id).value, to = %value, "filled placeholder");
            ast.node_mut(id).value = value;
        }
    }
}

fn default_value(ast: &Ast, id: NodeId) -> Option<String> {
    let node = ast.node(id);
    if !node.is_argument() || !is_placeholder(&node.value) {
        return None;
    }
    let arg_type = node.arg_type?;
    let parent = ast.parent(id).map(|p| ast.node(p));
    let under_utility = |name: &str| parent.map_or(false, |p| p.is_utility() && p.value == name);
    let utility = ast.utility_of(id).map(|u| u.value.as_str());

    match arg_type {
        ArgType::Path if under_utility("find") => Some(".".to_string()),
        ArgType::Regex if under_utility("grep") => Some("'.*'".to_string()),
        ArgType::Regex
            if node.value == "Regex"
                && parent.map_or(false, |p| p.kind == NodeKind::Option && p.value == "-name") =>
        {
            Some("\"*\"".to_string())
        }
        ArgType::Number if matches!(utility, Some("head") | Some("tail")) => Some("10".to_string()),
        t if t.is_open_vocab() => Some(format!("[{}]", t.as_str().to_ascii_lowercase())),
        _ => None,
    }
}

/// Type names, signed quantity names and entity markers.
fn is_placeholder(value: &str) -> bool {
    let unsigned = value.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(value);
    ArgType::ALL.iter().any(|t| {
        value == t.as_str()
            || value == t.entity_marker()
            || (t.is_quantity() && unsigned == t.as_str())
    })
}
