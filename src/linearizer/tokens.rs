//! Token linearization
//!
//! Depth-first emission of a subtree as a flat token stream, steered by a
//! [`Policy`]. Emission is buffered: a strict-mode violation anywhere in the
//! subtree discards everything and returns the error.

use crate::ast::{Ast, Node, NodeId, NodeKind};
use crate::error::{Arity, LinearizeError};
use crate::grammar::registry;
use crate::grammar::Associativity;
use crate::policy::Policy;

/// Linearize the subtree at `node`.
pub fn ast2tokens(ast: &Ast, node: NodeId, policy: &Policy) -> Result<Vec<String>, LinearizeError> {
    let mut writer = TokenWriter::new(ast, policy);
    writer.emit(node)?;
    Ok(writer.finish())
}

/// Tokens joined by single spaces. With the `template` preset this is the
/// argument-type template of the command.
pub fn ast2template(ast: &Ast, node: NodeId, policy: &Policy) -> Result<String, LinearizeError> {
    Ok(ast2tokens(ast, node, policy)?.join(" "))
}

/// Value an argument takes under `arg_type_only`, or `None` when the
/// argument stays literal.
pub fn abstract_value(node: &Node, policy: &Policy) -> Option<String> {
    if !policy.arg_type_only() || !node.is_open_vocab() {
        return None;
    }
    if policy.keep_common_args() && registry::is_common_argument(&node.value) {
        return None;
    }
    let arg_type = node.arg_type?;
    let sign = if arg_type.is_quantity() {
        match node.value.chars().next() {
            Some(c @ ('+' | '-')) => Some(c),
            _ => None,
        }
    } else {
        None
    };
    Some(match sign {
        Some(c) => format!("{}{}", c, arg_type),
        None => arg_type.to_string(),
    })
}

/// Replace open-vocabulary argument values in place with their abstracted
/// form.
pub fn abstract_arguments(ast: &mut Ast, policy: &Policy) {
    for id in ast.descendants(ast.root()) {
        if let Some(value) = abstract_value(ast.node(id), policy) {
            ast.node_mut(id).value = value;
        }
    }
}

/// Check a node's child count against the strict grammar. Loose policies
/// accept anything.
pub(crate) fn check_arity(
    ast: &Ast,
    id: NodeId,
    expected: Arity,
    policy: &Policy,
) -> Result<(), LinearizeError> {
    let node = ast.node(id);
    let found = node.num_children();
    if policy.loose_constraints() || expected.admits(found) {
        return Ok(());
    }
    tracing::debug!(kind = %node.kind, value = %node.value, %expected, found, "arity violation");
    Err(LinearizeError::ArityViolation {
        kind: node.kind,
        value: node.value.clone(),
        expected,
        found,
    })
}

/// Strict child count for each node kind.
pub(crate) fn strict_arity(kind: NodeKind) -> Option<Arity> {
    match kind {
        NodeKind::Root => Some(Arity::Exactly(1)),
        NodeKind::Pipeline => Some(Arity::AtLeast(2)),
        NodeKind::CommandSubstitution | NodeKind::ProcessSubstitution => Some(Arity::Exactly(1)),
        NodeKind::BinaryLogicOp | NodeKind::UnaryLogicOp => Some(Arity::Exactly(0)),
        NodeKind::Bracket | NodeKind::Nt => Some(Arity::AtLeast(1)),
        NodeKind::Argument | NodeKind::T => Some(Arity::Exactly(0)),
        NodeKind::Utility | NodeKind::Option => None,
    }
}

struct TokenWriter<'a> {
    ast: &'a Ast,
    policy: &'a Policy,
    out: Vec<String>,
}

impl<'a> TokenWriter<'a> {
    fn new(ast: &'a Ast, policy: &'a Policy) -> Self {
        Self { ast, policy, out: Vec::new() }
    }

    fn finish(self) -> Vec<String> {
        self.out
    }

    fn push(&mut self, token: impl Into<String>) {
        self.out.push(token.into());
    }

    fn emit_all(&mut self, children: &[NodeId]) -> Result<(), LinearizeError> {
        for child in children {
            self.emit(*child)?;
        }
        Ok(())
    }

    fn emit(&mut self, id: NodeId) -> Result<(), LinearizeError> {
        let ast = self.ast;
        let node = ast.node(id);
        if let Some(arity) = strict_arity(node.kind) {
            check_arity(ast, id, arity, self.policy)?;
        }
        let children = node.children();

        match node.kind {
            NodeKind::Root => {
                if self.policy.loose_constraints() {
                    self.emit_all(children)?;
                } else {
                    self.emit(children[0])?;
                }
            }
            NodeKind::Pipeline => match children {
                [] => self.push("|"),
                [only] => self.emit(*only)?,
                [init @ .., last] => {
                    for child in init {
                        self.emit(*child)?;
                        self.push("|");
                    }
                    self.emit(*last)?;
                }
            },
            NodeKind::CommandSubstitution | NodeKind::ProcessSubstitution => {
                let open = if node.kind == NodeKind::CommandSubstitution {
                    "$(".to_string()
                } else {
                    format!("{}(", node.value)
                };
                self.push(open);
                self.emit_all(children)?;
                self.push(")");
            }
            NodeKind::Utility => {
                self.push(node.value.clone());
                let ordered = ast.ordered_children(id, self.policy.ignore_flag_order());
                self.emit_all(&ordered)?;
            }
            NodeKind::Option => self.emit_option(id)?,
            NodeKind::BinaryLogicOp => match children {
                [] => self.push(node.value.clone()),
                [init @ .., last] => {
                    for child in init {
                        self.emit(*child)?;
                        self.push(node.value.clone());
                    }
                    self.emit(*last)?;
                }
            },
            NodeKind::UnaryLogicOp => {
                if node.associativity == Some(Associativity::Left) {
                    self.emit_all(children)?;
                    self.push(node.value.clone());
                } else {
                    self.push(node.value.clone());
                    self.emit_all(children)?;
                }
            }
            NodeKind::Bracket => {
                if children.len() < 2 && self.policy.loose_constraints() {
                    self.emit_all(children)?;
                } else {
                    self.push("\\(");
                    self.emit_all(children)?;
                    self.push("\\)");
                }
            }
            NodeKind::Nt => {
                self.push("(");
                self.emit_all(children)?;
                self.push(")");
            }
            NodeKind::Argument | NodeKind::T => {
                let token = self.argument_token(node);
                self.push(token);
                self.emit_all(children)?;
            }
        }
        Ok(())
    }

    fn emit_option(&mut self, id: NodeId) -> Result<(), LinearizeError> {
        let ast = self.ast;
        let node = ast.node(id);
        if node.parent().is_none() && !self.policy.loose_constraints() {
            return Err(LinearizeError::DetachedOption(node.value.clone()));
        }

        let (flag, terminator) = registry::split_terminator(&node.value);
        let mut token = flag.to_string();
        if self.policy.with_parent() {
            token = match ast.utility_of(id) {
                Some(utility) => format!("{}@@{}", utility.value, token),
                None => format!("@@{}", token),
            };
        }
        if self.policy.with_prefix() {
            token = format!("{}{}", node.simple_prefix, token);
        }
        self.push(token);
        self.emit_all(node.children())?;
        if let Some(op) = terminator {
            self.push(registry::render_terminator(op));
        }
        Ok(())
    }

    fn argument_token(&self, node: &Node) -> String {
        let mut token = abstract_value(node, self.policy).unwrap_or_else(|| node.value.clone());
        if (self.policy.with_prefix() || self.policy.with_parent()) && node.is_open_vocab() {
            token = format!("{}{}", node.simple_prefix, token);
        }
        if self.policy.with_arg_type() {
            if let Some(arg_type) = node.arg_type {
                token = format!("{}_{}", token, arg_type);
            }
        }
        if self.policy.index_arg() {
            if let Some(index) = node.index {
                token = format!("{}-{:02}", token, index);
            }
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ArgType;
    use crate::parser::normalizer::normalize_ast;
    use crate::policy::PolicyFlags;

    fn tokens(cmd: &str, policy: &Policy) -> Vec<String> {
        let ast = normalize_ast(cmd, policy.recover_quotation());
        ast2tokens(&ast, ast.root(), policy).unwrap()
    }

    fn policy(flags: PolicyFlags) -> Policy {
        Policy::new(flags).unwrap()
    }

    #[test]
    fn test_plain_tokens() {
        let p = Policy::default();
        assert_eq!(
            tokens("find . -name \"*.txt\" -exec rm {} \\;", &p),
            vec!["find", ".", "-name", "\"*.txt\"", "-exec", "rm", "{}", "\\;"]
        );
        assert_eq!(tokens("ls -la | grep foo", &p), vec!["ls", "-l", "-a", "|", "grep", "foo"]);
    }

    #[test]
    fn test_template_orders_flags_and_abstracts() {
        let p = Policy::preset("template").unwrap();
        let ast = normalize_ast("find . -name \"*.txt\" -exec rm {} \\;", true);
        assert_eq!(
            ast2template(&ast, ast.root(), &p).unwrap(),
            "find -exec rm {} \\; -name Regex Path"
        );
    }

    #[test]
    fn test_repeated_flags_sort_by_argument() {
        let p = Policy::default().with_ignore_flag_order(true);
        let forward = tokens("grep -e foo -e bar f", &p);
        assert_eq!(forward, vec!["grep", "-e", "bar", "-e", "foo", "f"]);
        assert_eq!(tokens("grep -e bar -e foo f", &p), forward);
    }

    #[test]
    fn test_quantity_sign_kept() {
        let p = policy(PolicyFlags { arg_type_only: true, ..Default::default() });
        assert_eq!(tokens("find . -size +10k", &p), vec!["find", "Path", "-size", "+Size"]);
        assert_eq!(tokens("find . -mtime -7", &p), vec!["find", "Path", "-mtime", "-Timespan"]);
    }

    #[test]
    fn test_keep_common_args() {
        let p = policy(PolicyFlags {
            arg_type_only: true,
            keep_common_args: true,
            ..Default::default()
        });
        assert_eq!(tokens("find . -name foo", &p), vec!["find", ".", "-name", "Regex"]);
    }

    #[test]
    fn test_with_parent_and_prefix() {
        let p = policy(PolicyFlags { with_parent: true, ..Default::default() });
        assert_eq!(
            tokens("head -n 5 a", &p),
            vec!["head", "head@@-n", "head@@-n@@5", "head@@a"]
        );
        let p = policy(PolicyFlags { with_prefix: true, ..Default::default() });
        assert_eq!(tokens("head -n 5 a", &p), vec!["head", "head@@-n", "head@@-n@@5", "head@@a"]);
    }

    #[test]
    fn test_arg_type_suffix_and_index() {
        let p = policy(PolicyFlags {
            with_arg_type: true,
            index_arg: true,
            ..Default::default()
        });
        assert_eq!(tokens("cp a b", &p), vec!["cp", "a_File-01", "b_File-02"]);
    }

    #[test]
    fn test_strict_rejects_multiple_statements() {
        let ast = normalize_ast("ls; pwd", true);
        let err = ast2tokens(&ast, ast.root(), &Policy::default()).unwrap_err();
        assert!(matches!(err, LinearizeError::ArityViolation { kind: NodeKind::Root, found: 2, .. }));
        let loose = Policy::preset("loose").unwrap();
        assert_eq!(ast2tokens(&ast, ast.root(), &loose).unwrap(), vec!["ls", "pwd"]);
    }

    #[test]
    fn test_loose_logic_chains() {
        let loose = Policy::preset("loose").unwrap();
        assert_eq!(
            tokens("mkdir a && cd a || ! pwd", &loose),
            vec!["mkdir", "a", "&&", "cd", "a", "||", "!", "pwd"]
        );
    }

    #[test]
    fn test_loose_pipeline_degradation() {
        let loose = Policy::preset("loose").unwrap();
        let mut ast = Ast::new();
        let pipe = ast.add_child(ast.root(), NodeKind::Pipeline, "|");
        assert_eq!(ast2tokens(&ast, pipe, &loose).unwrap(), vec!["|"]);
        assert!(ast2tokens(&ast, pipe, &Policy::default()).is_err());

        let ls = ast.add_child(pipe, NodeKind::Utility, "ls");
        assert_eq!(ast2tokens(&ast, pipe, &loose).unwrap(), ast2tokens(&ast, ls, &loose).unwrap());
    }

    #[test]
    fn test_loose_substitution_and_bracket() {
        let loose = Policy::preset("loose").unwrap();
        let mut ast = Ast::new();
        let sub = ast.add_child(ast.root(), NodeKind::CommandSubstitution, "$(");
        assert_eq!(ast2tokens(&ast, sub, &loose).unwrap(), vec!["$(", ")"]);

        let bracket = ast.add_child(ast.root(), NodeKind::Bracket, "\\(");
        ast.add_argument(bracket, "x", ArgType::Other);
        assert_eq!(ast2tokens(&ast, bracket, &loose).unwrap(), vec!["x"]);
        assert_eq!(ast2tokens(&ast, bracket, &Policy::default()).unwrap(), vec!["\\(", "x", "\\)"]);
    }

    #[test]
    fn test_detached_option() {
        let mut ast = Ast::new();
        let opt = ast.create(NodeKind::Option, "-l");
        let err = ast2tokens(&ast, opt, &Policy::default()).unwrap_err();
        assert_eq!(err, LinearizeError::DetachedOption("-l".to_string()));
        let loose = Policy::preset("loose").unwrap();
        let p = policy(PolicyFlags { with_parent: true, ..*loose.flags() });
        assert_eq!(ast2tokens(&ast, opt, &p).unwrap(), vec!["@@-l"]);
    }

    #[test]
    fn test_abstraction_is_idempotent() {
        let p = Policy::preset("template").unwrap();
        let mut ast = normalize_ast("find /tmp -size -2M -name '*.log'", true);
        let once = ast2tokens(&ast, ast.root(), &p).unwrap();
        abstract_arguments(&mut ast, &p);
        let twice = ast2tokens(&ast, ast.root(), &p).unwrap();
        assert_eq!(once, twice);
    }
}
