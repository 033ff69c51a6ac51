//! Parenthesized expression parser
//!
//! A small grammar for whitespace-separated, bracket-structured boolean
//! expressions such as `( and ( -name a ) ( -name b ) )`. Every `(` opens a
//! non-terminal, every other word is a terminal leaf.

use crate::ast::{Ast, NodeId, NodeKind};

/// Logic keywords whose operands are put in canonical order.
const ORDERED_OPERATORS: &[&str] = &["and", "or"];

/// Parse a parenthesized line. Missing outer parentheses are supplied, and
/// parsing stops once the outermost group closes.
pub fn paren_parser(line: &str) -> Ast {
    let mut text = line.trim().to_string();
    if !text.starts_with('(') {
        text.insert_str(0, "( ");
    }
    if !text.ends_with(')') {
        text.push_str(" )");
    }

    let mut ast = Ast::new();
    let mut stack: Vec<NodeId> = Vec::new();
    for word in text.split_whitespace() {
        match word {
            "(" => {
                let id = match stack.last() {
                    Some(top) => ast.add_child(*top, NodeKind::Nt, "<n>"),
                    None => ast.root(),
                };
                stack.push(id);
            }
            ")" => {
                stack.pop();
            }
            _ => {
                let top = stack.last().copied().unwrap_or(ast.root());
                ast.add_child(top, NodeKind::T, word);
            }
        }
        if stack.is_empty() {
            break;
        }
    }

    let root = ast.root();
    order_operands(&mut ast, root);
    ast
}

/// Sort the operands of every `and`/`or` group, leaving the operator first.
fn order_operands(ast: &mut Ast, id: NodeId) {
    for child in ast.children(id).to_vec() {
        order_operands(ast, child);
    }

    let children = ast.children(id).to_vec();
    if children.len() < 2 || !ORDERED_OPERATORS.contains(&ast.node(children[0]).value.as_str()) {
        return;
    }
    let mut operands = children[1..].to_vec();
    operands.sort_by_cached_key(|c| sort_key(ast, *c));
    let mut order = vec![children[0]];
    order.extend(operands);
    ast.reorder_children(id, order);
}

fn sort_key(ast: &Ast, id: NodeId) -> String {
    let node = ast.node(id);
    if node.kind == NodeKind::T {
        return node.value.clone();
    }
    match ast.children(id).first() {
        Some(first) => ast.node(*first).value.clone(),
        None => node.value.clone(),
    }
}
