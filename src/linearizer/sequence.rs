//! Sentinel sequence encoding
//!
//! The reversible linearization consumed by sequence models. Every node is
//! written as `KIND(value)` (arguments add `<Type>`) and closed by a sentinel
//! that says whether children were written.

use crate::ast::{Ast, NodeId};
use crate::error::LinearizeError;
use crate::linearizer::tokens::abstract_value;
use crate::parser::sequence::{H_NO_EXPAND, NO_EXPAND};
use crate::policy::Policy;

/// Traversal order of [`ast2list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Dfs,
    Bfs,
}

/// Encode the subtree at `node`. With the default policy the result decodes
/// back to an identical tree through [`list2ast`](crate::parser::list2ast).
pub fn ast2list(
    ast: &Ast,
    node: NodeId,
    order: Order,
    policy: &Policy,
) -> Result<Vec<String>, LinearizeError> {
    match order {
        Order::Dfs => {
            let mut out = Vec::new();
            encode(ast, node, policy, &mut out);
            Ok(out)
        }
        Order::Bfs => Err(LinearizeError::Unsupported(
            "breadth-first sequence encoding".to_string(),
        )),
    }
}

fn encode(ast: &Ast, id: NodeId, policy: &Policy, out: &mut Vec<String>) {
    let node = ast.node(id);

    let mut value = abstract_value(node, policy).unwrap_or_else(|| node.value.clone());
    if node.is_option() && policy.with_parent() {
        if let Some(utility) = ast.utility_of(id) {
            value = format!("{}@@{}", utility.value, value);
        }
    }
    if policy.with_prefix() && (node.is_option() || node.is_open_vocab()) {
        value = format!("{}{}", node.simple_prefix, value);
    }

    let kind = node.kind.as_str().to_ascii_uppercase();
    out.push(match node.arg_type {
        Some(arg_type) => format!("{}({})<{}>", kind, value, arg_type),
        None => format!("{}({})", kind, value),
    });

    if node.num_children() == 0 {
        out.push(NO_EXPAND.to_string());
        return;
    }
    for child in ast.ordered_children(id, policy.ignore_flag_order()) {
        encode(ast, child, policy, out);
    }
    out.push(H_NO_EXPAND.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalizer::normalize_ast;
    use crate::parser::sequence::list2ast;

    #[test]
    fn test_encoding_shape() {
        let ast = normalize_ast("head -n 5 a.txt", true);
        let list = ast2list(&ast, ast.root(), Order::Dfs, &Policy::default()).unwrap();
        assert_eq!(
            list,
            vec![
                "ROOT(root)",
                "UTILITY(head)",
                "OPTION(-n)",
                "ARGUMENT(5)<Number>",
                NO_EXPAND,
                H_NO_EXPAND,
                "ARGUMENT(a.txt)<File>",
                NO_EXPAND,
                H_NO_EXPAND,
                H_NO_EXPAND,
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        for cmd in [
            "find . -name \"*.txt\" -exec rm {} \\;",
            "ls -la | grep foo | wc -l",
            "echo $(date)",
            "find / \\( -name a -o -name b \\) ! -type d",
            "diff <(sort a) <(sort b)",
        ] {
            let ast = normalize_ast(cmd, true);
            let list = ast2list(&ast, ast.root(), Order::Dfs, &Policy::default()).unwrap();
            assert_eq!(list2ast(&list), ast, "round trip failed for {}", cmd);
        }
    }

    #[test]
    fn test_template_sequence() {
        let ast = normalize_ast("grep -r foo src", true);
        let policy = Policy::preset("template").unwrap();
        let list = ast2list(&ast, ast.root(), Order::Dfs, &policy).unwrap();
        assert!(list.contains(&"ARGUMENT(Regex)<Regex>".to_string()));
        assert!(list.contains(&"ARGUMENT(File)<File>".to_string()));
    }

    #[test]
    fn test_bfs_unsupported() {
        let ast = normalize_ast("ls", true);
        let err = ast2list(&ast, ast.root(), Order::Bfs, &Policy::default()).unwrap_err();
        assert!(matches!(err, LinearizeError::Unsupported(_)));
    }
}
