//! Sentinel sequence decoder
//!
//! Rebuilds an [`Ast`] from the depth-first sequence produced by
//! [`ast2list`](crate::linearizer::ast2list). Each node is written as
//! `KIND(value)` or `ARGUMENT(value)<Type>` and closed by either
//! [`NO_EXPAND`] (leaf) or [`H_NO_EXPAND`] (after its children).

use crate::ast::{Ast, NodeId, NodeKind};
use crate::error::MalformedInput;
use crate::grammar::ArgType;
use crate::parser::normalizer::annotate;

/// Closes a node without children.
pub const NO_EXPAND: &str = "<NO_EXPAND>";
/// Closes a node after its children.
pub const H_NO_EXPAND: &str = "<H_NO_EXPAND>";

/// Decode a sentinel sequence. Tokens that do not decode become terminal
/// nodes; unmatched sentinels are ignored.
pub fn list2ast<S: AsRef<str>>(tokens: &[S]) -> Ast {
    let mut ast = Ast::new();
    let mut stack: Vec<NodeId> = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        if token == NO_EXPAND || token == H_NO_EXPAND {
            if stack.pop().is_none() {
                tracing::trace!(token, "unmatched sentinel");
            }
            continue;
        }

        let parent = stack.last().copied().unwrap_or(ast.root());
        let id = match decode_node(token) {
            Ok((NodeKind::Root, _, _)) if stack.is_empty() => ast.root(),
            Ok((kind, value, arg_type)) => {
                let id = ast.add_child(parent, kind, value);
                ast.node_mut(id).arg_type = arg_type;
                id
            }
            Err(e) => {
                tracing::debug!(token = %e.token, reason = %e.reason, "kept as terminal");
                ast.add_child(parent, NodeKind::T, token)
            }
        };
        stack.push(id);
    }

    annotate(&mut ast);
    ast
}

/// Split `KIND(value)` / `ARGUMENT(value)<Type>` into its parts.
pub fn decode_node(token: &str) -> Result<(NodeKind, String, Option<ArgType>), MalformedInput> {
    let open = token
        .find('(')
        .ok_or_else(|| MalformedInput::new(token, "missing '('"))?;
    let kind = NodeKind::from_name(&token[..open])
        .ok_or_else(|| MalformedInput::new(token, "unknown node kind"))?;

    if kind == NodeKind::Argument {
        let close = token
            .rfind(")<")
            .filter(|close| *close >= open && token.ends_with('>'))
            .ok_or_else(|| MalformedInput::new(token, "argument without type"))?;
        let arg_type = token[close + 2..token.len() - 1]
            .parse::<ArgType>()
            .map_err(|e| MalformedInput::new(token, e))?;
        return Ok((kind, token[open + 1..close].to_string(), Some(arg_type)));
    }

    let close = token
        .rfind(')')
        .filter(|close| *close == token.len() - 1)
        .ok_or_else(|| MalformedInput::new(token, "missing ')'"))?;
    Ok((kind, token[open + 1..close].to_string(), None))
}
