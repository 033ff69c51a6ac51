//! Serializer
//!
//! Renders an AST back to shell syntax. Words are separated by single
//! spaces and quoting is whatever the normalizer recovered, so the output
//! re-normalizes to the same tree rather than reproducing the input bytes.

use crate::ast::{Ast, NodeId, NodeKind};
use crate::error::LinearizeError;
use crate::grammar::registry;
use crate::grammar::Associativity;
use crate::linearizer::tokens::{check_arity, strict_arity};
use crate::policy::Policy;

/// Render the subtree at `node` as a command string.
pub fn ast2command(ast: &Ast, node: NodeId, policy: &Policy) -> Result<String, LinearizeError> {
    Serializer { ast, policy }.render(node)
}

struct Serializer<'a> {
    ast: &'a Ast,
    policy: &'a Policy,
}

impl Serializer<'_> {
    fn render_all(&self, children: &[NodeId], sep: &str) -> Result<String, LinearizeError> {
        let parts = children
            .iter()
            .map(|c| self.render(*c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(sep))
    }

    fn render(&self, id: NodeId) -> Result<String, LinearizeError> {
        let node = self.ast.node(id);
        if let Some(arity) = strict_arity(node.kind) {
            check_arity(self.ast, id, arity, self.policy)?;
        }
        let children = node.children();

        let text = match node.kind {
            NodeKind::Root => self.render_all(children, "; ")?,
            NodeKind::Pipeline => {
                if children.is_empty() {
                    "|".to_string()
                } else {
                    self.render_all(children, " | ")?
                }
            }
            NodeKind::CommandSubstitution => format!("$({})", self.render_all(children, "; ")?),
            NodeKind::ProcessSubstitution => {
                format!("{}({})", node.value, self.render_all(children, "; ")?)
            }
            NodeKind::Utility => {
                let ordered = self.emission_order(id);
                join_words(&node.value, &self.render_all(&ordered, " ")?)
            }
            NodeKind::Option => self.render_option(id)?,
            NodeKind::BinaryLogicOp => {
                if children.is_empty() {
                    node.value.clone()
                } else {
                    self.render_all(children, &format!(" {} ", node.value))?
                }
            }
            NodeKind::UnaryLogicOp => {
                let operand = self.render_all(children, " ")?;
                if node.associativity == Some(Associativity::Left) {
                    join_words(&operand, &node.value)
                } else {
                    join_words(&node.value, &operand)
                }
            }
            NodeKind::Bracket => {
                let inner = self.render_all(children, " ")?;
                if children.len() < 2 && self.policy.loose_constraints() {
                    inner
                } else {
                    format!("\\( {} \\)", inner)
                }
            }
            NodeKind::Nt => format!("( {} )", self.render_all(children, "; ")?),
            NodeKind::Argument | NodeKind::T => {
                join_words(&node.value, &self.render_all(children, " ")?)
            }
        };
        Ok(text)
    }

    /// Utility children with each run of adjacent options sorted when flag
    /// order is ignored. Operands, logic operators and `--` stay put.
    fn emission_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.ast.children(id).to_vec();
        if self.policy.ignore_flag_order() {
            let fixed = |c: &NodeId| {
                let n = self.ast.node(*c);
                !n.is_option() || n.value == "--"
            };
            for run in children.split_mut(fixed) {
                run.sort_by(|a, b| self.ast.cmp_subtrees(*a, *b));
            }
        }
        children
    }

    fn render_option(&self, id: NodeId) -> Result<String, LinearizeError> {
        let node = self.ast.node(id);
        if node.parent().is_none() && !self.policy.loose_constraints() {
            return Err(LinearizeError::DetachedOption(node.value.clone()));
        }
        let (flag, terminator) = registry::split_terminator(&node.value);

        // `--flag value` does not re-normalize when the utility does not
        // declare the flag, `--flag=value` always does.
        if let [only] = node.children() {
            let child = self.ast.node(*only);
            if flag.starts_with("--") && child.is_argument() && child.num_children() == 0 {
                return Ok(format!("{}={}", flag, child.value));
            }
        }

        let mut text = join_words(flag, &self.render_all(node.children(), " ")?);
        if let Some(op) = terminator {
            text = join_words(&text, registry::render_terminator(op));
        }
        Ok(text)
    }
}

fn join_words(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (_, true) => head.to_string(),
        (true, false) => tail.to_string(),
        (false, false) => format!("{} {}", head, tail),
    }
}
