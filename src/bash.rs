//! Bash Command Front End
//!
//! Main entry points for turning command text into trees, token streams and
//! re-serialized commands. Ties together the normalizer, the linearizer and
//! the serializer under one policy.

use crate::ast::Ast;
use crate::error::{LinearizeError, MalformedInput};
use crate::linearizer::{ast2list, ast2template, ast2tokens, Order};
use crate::parser::Normalizer;
use crate::policy::Policy;
use crate::serializer::ast2command;

/// Marker placed after every character by [`char_tokenizer`].
pub const SPACE: &str = "<SPACE>";

/// Parse a command into its normalized AST.
pub fn bash_parser(cmd: &str, recover_quotation: bool) -> Ast {
    Normalizer::new(recover_quotation).normalize(cmd)
}

/// Parse and linearize in one step.
pub fn bash_tokenizer(cmd: &str, policy: &Policy) -> Result<Vec<String>, LinearizeError> {
    let ast = bash_parser(cmd, policy.recover_quotation());
    ast2tokens(&ast, ast.root(), policy)
}

/// Parse and render the template in one step. Use with the `template`
/// preset to get argument types instead of literals.
pub fn cmd2template(cmd: &str, policy: &Policy) -> Result<String, LinearizeError> {
    let ast = bash_parser(cmd, policy.recover_quotation());
    ast2template(&ast, ast.root(), policy)
}

/// Character-level tokens: every character followed by [`SPACE`], with
/// spaces themselves written as [`SPACE`].
pub fn char_tokenizer(sentence: &str) -> Vec<String> {
    let mut chars = Vec::with_capacity(sentence.len() * 2);
    for c in sentence.chars() {
        if c == ' ' {
            chars.push(SPACE.to_string());
        } else {
            chars.push(c.to_string());
        }
        chars.push(SPACE.to_string());
    }
    chars
}

/// Options for creating a [`Bash`] front end.
#[derive(Debug, Default, Clone)]
pub struct BashOptions {
    /// Policy used by every conversion (defaults to `Policy::default()`)
    pub policy: Option<Policy>,
}

/// A conversion session: one policy, and the diagnostics of the last parse.
#[derive(Debug)]
pub struct Bash {
    policy: Policy,
    diagnostics: Vec<MalformedInput>,
}

impl Bash {
    pub fn new(options: BashOptions) -> Self {
        Self {
            policy: options.policy.unwrap_or_default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Input the last parse kept as literal.
    pub fn diagnostics(&self) -> &[MalformedInput] {
        &self.diagnostics
    }

    /// Parse a command, recording diagnostics.
    pub fn parse(&mut self, cmd: &str) -> Ast {
        let mut normalizer = Normalizer::new(self.policy.recover_quotation());
        let ast = normalizer.normalize(cmd);
        self.diagnostics = normalizer.diagnostics().to_vec();
        if !self.diagnostics.is_empty() {
            tracing::debug!(count = self.diagnostics.len(), cmd, "parsed with diagnostics");
        }
        ast
    }

    pub fn tokens(&mut self, cmd: &str) -> Result<Vec<String>, LinearizeError> {
        let ast = self.parse(cmd);
        ast2tokens(&ast, ast.root(), &self.policy)
    }

    pub fn template(&mut self, cmd: &str) -> Result<String, LinearizeError> {
        let ast = self.parse(cmd);
        ast2template(&ast, ast.root(), &self.policy)
    }

    pub fn command(&mut self, cmd: &str) -> Result<String, LinearizeError> {
        let ast = self.parse(cmd);
        ast2command(&ast, ast.root(), &self.policy)
    }

    pub fn list(&mut self, cmd: &str) -> Result<Vec<String>, LinearizeError> {
        let ast = self.parse(cmd);
        ast2list(&ast, ast.root(), Order::Dfs, &self.policy)
    }
}

/// Split a batch of commands into one command per line, dropping blank
/// lines and `#` comments. A trailing backslash joins the next line.
pub fn split_commands(script: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut pending = String::new();

    for line in script.lines() {
        let line = line.trim();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#')) {
            continue;
        }
        if let Some(head) = line.strip_suffix('\\') {
            pending.push_str(head);
            continue;
        }
        pending.push_str(line);
        commands.push(std::mem::take(&mut pending));
    }
    if !pending.trim().is_empty() {
        commands.push(pending);
    }
    commands
}

// ============================================================================
// Tests
// ============================================================================
