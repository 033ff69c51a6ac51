//! Command Normalizer
//!
//! Turns command text into a canonical [`Ast`]. Recognized utilities have
//! their flags paired with arguments through the grammar registry; anything
//! the grammar does not cover degrades to literal nodes and a recorded
//! [`MalformedInput`] diagnostic instead of an error.
//!
//! Grammar (restricted):
//!   list      ::= and_or ((; | & | NEWLINE) and_or)*
//!   and_or    ::= pipeline ((&& | '||') pipeline)*
//!   pipeline  ::= [!] command ('|' command)*
//!   command   ::= '(' list ')' | utility
//!   utility   ::= WORD (flag | operand | redirection)*

use crate::ast::{Ast, NodeId, NodeKind};
use crate::error::MalformedInput;
use crate::grammar::registry;
use crate::grammar::{ArgType, OptionArity, OptionSpec, UtilitySpec};
use crate::parser::lexer::{Lexer, Token, TokenType};
use crate::parser::quoting::recover_word;
use crate::parser::types::{
    group_spans_rest, is_exec_terminator, is_list_separator, looks_like_flag, MAX_PARSER_DEPTH,
};

/// Parse a command into a normalized AST.
pub fn normalize_ast(cmd: &str, recover_quotation: bool) -> Ast {
    Normalizer::new(recover_quotation).normalize(cmd)
}

/// Per-utility parsing state
struct UtilityScope {
    name: String,
    spec: Option<&'static UtilitySpec>,
    /// Innermost open `\(` group last
    containers: Vec<NodeId>,
    positional: usize,
    end_of_options: bool,
    command_seen: bool,
}

impl UtilityScope {
    fn container(&self) -> NodeId {
        self.containers[self.containers.len() - 1]
    }
}

pub struct Normalizer {
    recover_quotation: bool,
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
    diagnostics: Vec<MalformedInput>,
    exec_depth: usize,
    depth: usize,
}

impl Normalizer {
    pub fn new(recover_quotation: bool) -> Self {
        Self {
            recover_quotation,
            tokens: Vec::new(),
            pos: 0,
            ast: Ast::new(),
            diagnostics: Vec::new(),
            exec_depth: 0,
            depth: 0,
        }
    }

    /// Input the last `normalize` call could not interpret.
    pub fn diagnostics(&self) -> &[MalformedInput] {
        &self.diagnostics
    }

    /// Parse `cmd`. Never fails: unknown pieces become literal nodes.
    pub fn normalize(&mut self, cmd: &str) -> Ast {
        self.tokens = Lexer::new(cmd).tokenize();
        self.pos = 0;
        self.ast = Ast::new();
        self.diagnostics.clear();
        self.exec_depth = 0;
        self.depth = 0;

        let root = self.ast.root();
        loop {
            self.parse_list(root);
            if self.check(TokenType::Eof) {
                break;
            }
            let stray = self.advance();
            self.malformed(&stray.raw, "unbalanced closing parenthesis");
            self.ast.add_child(root, NodeKind::T, stray.raw);
        }

        let mut ast = std::mem::take(&mut self.ast);
        prune_redundant_flags(&mut ast);
        annotate(&mut ast);
        ast
    }

    // -------------------------------------------------------------------------
    // Token cursor
    // -------------------------------------------------------------------------

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn check(&self, t: TokenType) -> bool {
        self.current().token_type == t
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenType::Newline) {
            self.advance();
        }
    }

    fn malformed(&mut self, token: &str, reason: impl Into<String>) {
        let diagnostic = MalformedInput::new(token, reason);
        tracing::debug!(token = %diagnostic.token, reason = %diagnostic.reason, "keeping literal");
        self.diagnostics.push(diagnostic);
    }

    // -------------------------------------------------------------------------
    // Lists, logic, pipelines
    // -------------------------------------------------------------------------

    fn parse_list(&mut self, parent: NodeId) {
        loop {
            while is_list_separator(self.current().token_type) {
                if self.check(TokenType::Amp) {
                    self.malformed("&", "background operator dropped");
                }
                self.advance();
            }
            if self.check(TokenType::Eof) || self.check(TokenType::RParen) {
                return;
            }
            let start = self.pos;
            if let Some(node) = self.parse_and_or() {
                self.ast.attach(parent, node);
            }
            if self.pos == start {
                let stray = self.advance();
                self.malformed(&stray.raw, "unexpected token");
                self.ast.add_child(parent, NodeKind::T, stray.raw);
            }
        }
    }

    fn parse_and_or(&mut self) -> Option<NodeId> {
        let mut left = self.parse_pipeline()?;
        while self.check(TokenType::AndAnd) || self.check(TokenType::OrOr) {
            let op = self.advance().value;
            self.skip_newlines();
            match self.parse_pipeline() {
                Some(right) => left = self.join_logic(left, &op, right),
                None => {
                    self.malformed(&op, "missing right operand");
                    let node = self.ast.create(NodeKind::BinaryLogicOp, op);
                    self.ast.attach(node, left);
                    return Some(node);
                }
            }
        }
        Some(left)
    }

    /// Chains of the same operator collapse into one n-ary node.
    fn join_logic(&mut self, left: NodeId, op: &str, right: NodeId) -> NodeId {
        let l = self.ast.node(left);
        if l.kind == NodeKind::BinaryLogicOp && l.value == op && l.num_children() > 0 {
            self.ast.attach(left, right);
            return left;
        }
        let node = self.ast.create(NodeKind::BinaryLogicOp, op);
        self.ast.attach(node, left);
        self.ast.attach(node, right);
        node
    }

    fn parse_pipeline(&mut self) -> Option<NodeId> {
        if self.current().is_bare("!") {
            let bang = self.advance();
            if self.depth >= MAX_PARSER_DEPTH {
                self.malformed(&bang.raw, "nesting too deep");
                return Some(self.ast.create(NodeKind::T, bang.raw));
            }
            let node = self.ast.create(NodeKind::UnaryLogicOp, "!");
            self.depth += 1;
            let operand = self.parse_pipeline();
            self.depth -= 1;
            match operand {
                Some(operand) => self.ast.attach(node, operand),
                None => self.malformed("!", "missing operand"),
            }
            return Some(node);
        }

        let first = self.parse_command()?;
        if !self.check(TokenType::Pipe) {
            return Some(first);
        }

        let pipeline = self.ast.create(NodeKind::Pipeline, "|");
        self.ast.attach(pipeline, first);
        while self.check(TokenType::Pipe) {
            self.advance();
            self.skip_newlines();
            match self.parse_command() {
                Some(command) => self.ast.attach(pipeline, command),
                None => {
                    self.malformed("|", "missing command after pipe");
                    break;
                }
            }
        }
        Some(pipeline)
    }

    fn parse_command(&mut self) -> Option<NodeId> {
        match self.current().token_type {
            TokenType::LParen => {
                self.advance();
                let group = self.ast.create(NodeKind::Nt, "<n>");
                if self.depth >= MAX_PARSER_DEPTH {
                    self.malformed("(", "nesting too deep");
                    return Some(group);
                }
                self.depth += 1;
                self.parse_list(group);
                self.depth -= 1;
                if self.check(TokenType::RParen) {
                    self.advance();
                } else {
                    self.malformed("(", "missing closing parenthesis");
                }
                Some(group)
            }
            TokenType::Word => {
                let name = self.advance();
                Some(self.parse_utility(name))
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Utilities
    // -------------------------------------------------------------------------

    fn parse_utility(&mut self, name: Token) -> NodeId {
        let utility = self.ast.create(NodeKind::Utility, name.value.clone());
        let spec = registry::lookup(&name.value);
        if spec.is_none() {
            self.malformed(&name.raw, "unknown utility, operands kept as literals");
        }
        let mut scope = UtilityScope {
            name: name.value,
            spec,
            containers: vec![utility],
            positional: 0,
            end_of_options: false,
            command_seen: false,
        };

        loop {
            let token = self.current().clone();
            match token.token_type {
                TokenType::Redirect => {
                    self.advance();
                    self.parse_redirect(scope.container(), &token);
                }
                TokenType::Word => {
                    if self.exec_depth > 0 && is_exec_terminator(&token) {
                        break;
                    }
                    self.advance();
                    self.parse_word(&mut scope, token);
                }
                _ => break,
            }
        }

        if scope.containers.len() > 1 {
            self.malformed("\\(", "unclosed bracket group");
        }
        utility
    }

    /// A utility run by another one (`xargs rm`, `-exec rm`).
    fn parse_nested_utility(&mut self, name: Token) -> NodeId {
        self.depth += 1;
        let utility = self.parse_utility(name);
        self.depth -= 1;
        utility
    }

    fn parse_word(&mut self, scope: &mut UtilityScope, token: Token) {
        let container = scope.container();
        let logic = scope.spec.map_or(false, |s| s.logic);

        if logic && !scope.end_of_options {
            if token.value == "(" && token.quoted {
                let bracket = self.ast.add_child(container, NodeKind::Bracket, "\\(");
                scope.containers.push(bracket);
                return;
            }
            if token.value == ")" && token.quoted {
                if scope.containers.len() > 1 {
                    scope.containers.pop();
                } else {
                    self.malformed(&token.raw, "unbalanced bracket");
                    self.ast.add_child(container, NodeKind::T, token.raw);
                }
                return;
            }
            if !token.quoted && registry::is_binary_logic_op(&token.value) {
                self.ast.add_child(container, NodeKind::BinaryLogicOp, token.value);
                return;
            }
            if let Some(associativity) = registry::unary_logic_op(&token.value) {
                let node = self.ast.add_child(container, NodeKind::UnaryLogicOp, token.value);
                self.ast.node_mut(node).associativity = Some(associativity);
                return;
            }
        }

        if !scope.end_of_options && token.is_bare("--") {
            scope.end_of_options = true;
            self.ast.add_child(container, NodeKind::Option, "--");
            return;
        }

        if !scope.end_of_options && looks_like_flag(&token) && self.is_flag(scope, &token) {
            self.parse_flag(scope, &token);
            return;
        }

        if scope.spec.map_or(false, |s| s.takes_command) && !scope.command_seen {
            scope.command_seen = true;
            if self.depth < MAX_PARSER_DEPTH {
                let nested = self.parse_nested_utility(token);
                self.ast.attach(container, nested);
                return;
            }
            self.malformed(&token.raw, "nesting too deep");
        }

        let node = self.parse_operand(&token, scope.spec, scope.positional);
        self.ast.attach(container, node);
        scope.positional += 1;
    }

    /// `-5` is an operand unless the utility declares it as a flag.
    fn is_flag(&self, scope: &UtilityScope, token: &Token) -> bool {
        let second = token.value.chars().nth(1);
        if second.map_or(false, |c| c.is_ascii_digit()) {
            return scope.spec.map_or(false, |s| s.option(&token.value).is_some());
        }
        true
    }

    fn parse_operand(
        &mut self,
        token: &Token,
        spec: Option<&'static UtilitySpec>,
        index: usize,
    ) -> NodeId {
        if let Some(node) = self.parse_substitution(token) {
            return node;
        }
        let arg_type = if token.value == "{}" {
            ArgType::ReservedWord
        } else {
            registry::positional_arg_type(spec, index, &token.value)
        };
        let text = recover_word(token, self.recover_quotation);
        self.ast.create_argument(text, arg_type)
    }

    fn parse_redirect(&mut self, container: NodeId, token: &Token) {
        self.ast.add_argument(container, token.value.clone(), ArgType::ReservedWord);
        let duplicated = token.value.contains('&')
            && token.value.ends_with(|c: char| c.is_ascii_digit() || c == '-')
            && !token.value.starts_with('&');
        if duplicated {
            return;
        }
        if self.check(TokenType::Word) {
            let target = self.advance();
            let text = recover_word(&target, self.recover_quotation);
            self.ast.add_argument(container, text, ArgType::File);
        } else {
            self.malformed(&token.value, "redirection without target");
        }
    }

    // -------------------------------------------------------------------------
    // Flags
    // -------------------------------------------------------------------------

    fn parse_flag(&mut self, scope: &UtilityScope, token: &Token) {
        let container = scope.container();
        let value = token.value.as_str();

        if let Some(spec) = scope.spec {
            if let Some(option) = spec.option(value) {
                self.add_option(container, option);
                return;
            }
        }

        if value.starts_with("--") {
            if let Some((flag, arg)) = value.split_once('=') {
                let declared = scope.spec.and_then(|s| s.option(flag)).and_then(|o| match o.arity {
                    OptionArity::Value(t) => Some(t),
                    _ => None,
                });
                if scope.spec.is_some() && declared.is_none() {
                    self.malformed(value, format!("unknown flag for {}", scope.name));
                }
                let arg_type = declared.unwrap_or_else(|| registry::infer_arg_type(arg));
                let option = self.ast.add_child(container, NodeKind::Option, flag);
                self.ast.add_argument(option, arg, arg_type);
                return;
            }
        } else if let Some(spec) = scope.spec {
            if self.split_short_cluster(container, spec, value) {
                return;
            }
        }

        if scope.spec.is_some() {
            self.malformed(value, format!("unknown flag for {}", scope.name));
        }
        self.ast.add_child(container, NodeKind::Option, value);
    }

    /// `-la` → `-l -a`; `-n10` → `-n 10`. Only when every letter is a known
    /// flag of the utility.
    fn split_short_cluster(&mut self, container: NodeId, spec: &UtilitySpec, value: &str) -> bool {
        let letters: Vec<char> = value.chars().skip(1).collect();
        if letters.len() < 2 {
            return false;
        }

        let mut plan: Vec<(&'static OptionSpec, Option<String>)> = Vec::new();
        for (i, c) in letters.iter().enumerate() {
            let Some(option) = spec.option(&format!("-{}", c)) else {
                return false;
            };
            match option.arity {
                OptionArity::Flag => plan.push((option, None)),
                OptionArity::Value(_) => {
                    let rest: String = letters[i + 1..].iter().collect();
                    plan.push((option, if rest.is_empty() { None } else { Some(rest) }));
                    break;
                }
                OptionArity::Command => return false,
            }
        }

        for (option, attached) in plan {
            match (attached, option.arity) {
                (Some(arg), OptionArity::Value(t)) => {
                    let node = self.ast.add_child(container, NodeKind::Option, option.flag);
                    self.ast.add_argument(node, arg, t);
                }
                _ => self.add_option(container, option),
            }
        }
        true
    }

    fn add_option(&mut self, container: NodeId, option: &OptionSpec) {
        match option.arity {
            OptionArity::Flag => {
                self.ast.add_child(container, NodeKind::Option, option.flag);
            }
            OptionArity::Value(arg_type) => {
                let node = self.ast.add_child(container, NodeKind::Option, option.flag);
                let next = self.current().clone();
                if !next.is_word() || (self.exec_depth > 0 && is_exec_terminator(&next)) {
                    self.malformed(option.flag, "missing argument");
                    return;
                }
                self.advance();
                let arg = match self.parse_substitution(&next) {
                    Some(sub) => sub,
                    None => {
                        let text = recover_word(&next, self.recover_quotation);
                        self.ast.create_argument(text, arg_type)
                    }
                };
                self.ast.attach(node, arg);
            }
            OptionArity::Command => self.parse_exec(container, option.flag),
        }
    }

    /// `-exec cmd ... \;` → option `-exec::;` holding the nested utility.
    fn parse_exec(&mut self, container: NodeId, flag: &str) {
        let node = self.ast.add_child(container, NodeKind::Option, flag);

        self.exec_depth += 1;
        let next = self.current().clone();
        if self.depth >= MAX_PARSER_DEPTH {
            self.malformed(flag, "nesting too deep");
        } else if next.is_word() && !is_exec_terminator(&next) {
            self.advance();
            let nested = self.parse_nested_utility(next);
            self.ast.attach(node, nested);
        } else {
            self.malformed(flag, "missing command");
        }
        self.exec_depth -= 1;

        let terminator = if is_exec_terminator(self.current()) {
            let token = self.advance();
            if token.token_type == TokenType::Semicolon {
                ";".to_string()
            } else {
                token.value
            }
        } else {
            self.malformed(flag, "missing terminator");
            ";".to_string()
        };
        self.ast.node_mut(node).value = registry::join_terminator(flag, &terminator);
    }

    // -------------------------------------------------------------------------
    // Substitutions
    // -------------------------------------------------------------------------

    fn parse_substitution(&mut self, token: &Token) -> Option<NodeId> {
        if token.quoted {
            return None;
        }
        let value = token.value.as_str();
        let (kind, node_value, inner) = if value.starts_with("$(") && group_spans_rest(value, 1) {
            (NodeKind::CommandSubstitution, "$(", &value[2..value.len() - 1])
        } else if (value.starts_with("<(") || value.starts_with(">(")) && group_spans_rest(value, 1) {
            (NodeKind::ProcessSubstitution, &value[..1], &value[2..value.len() - 1])
        } else if value.len() >= 2
            && value.starts_with('`')
            && value.ends_with('`')
            && value.matches('`').count() == 2
        {
            (NodeKind::CommandSubstitution, "$(", &value[1..value.len() - 1])
        } else {
            return None;
        };

        let node = self.ast.create(kind, node_value);
        if self.depth >= MAX_PARSER_DEPTH {
            self.malformed(value, "nesting too deep");
            return Some(node);
        }
        self.parse_nested(inner, node);
        Some(node)
    }

    /// Parse `text` as a command list under `parent`, then resume the
    /// enclosing token stream.
    fn parse_nested(&mut self, text: &str, parent: NodeId) {
        let tokens = std::mem::replace(&mut self.tokens, Lexer::new(text).tokenize());
        let pos = std::mem::replace(&mut self.pos, 0);
        let exec_depth = std::mem::replace(&mut self.exec_depth, 0);
        self.depth += 1;

        loop {
            self.parse_list(parent);
            if self.check(TokenType::Eof) {
                break;
            }
            let stray = self.advance();
            self.malformed(&stray.raw, "unbalanced closing parenthesis");
            self.ast.add_child(parent, NodeKind::T, stray.raw);
        }

        self.depth -= 1;
        self.exec_depth = exec_depth;
        self.pos = pos;
        self.tokens = tokens;
    }
}

/// Drop repeated boolean switches (`ls -l -l`). Utilities with logic
/// expressions keep every predicate since order and repetition matter there.
fn prune_redundant_flags(ast: &mut Ast) {
    for id in ast.descendants(ast.root()) {
        let node = ast.node(id);
        if !node.is_utility() || registry::lookup(&node.value).map_or(false, |s| s.logic) {
            continue;
        }
        let mut seen: Vec<String> = Vec::new();
        let mut redundant = Vec::new();
        for child in ast.children(id) {
            let c = ast.node(*child);
            if c.is_option() && c.num_children() == 0 {
                if seen.contains(&c.value) {
                    redundant.push(*child);
                } else {
                    seen.push(c.value.clone());
                }
            }
        }
        for child in redundant {
            ast.remove_child(id, child);
        }
    }
}

/// Assign structural prefixes and positional indices.
pub(crate) fn annotate(ast: &mut Ast) {
    for id in ast.descendants(ast.root()) {
        let utility = ast.utility_of(id).map(|u| u.value.clone());
        let parent = ast.parent(id).map(|p| ast.node(p));
        let prefix = match (ast.node(id).kind, utility, parent) {
            (NodeKind::Option, Some(u), _) => format!("{}@@", u),
            (NodeKind::Argument, Some(u), Some(p)) if p.is_option() => {
                let (flag, _) = registry::split_terminator(&p.value);
                format!("{}@@{}@@", u, flag)
            }
            (NodeKind::Argument, Some(u), _) => format!("{}@@", u),
            _ => String::new(),
        };
        let node = ast.node_mut(id);
        node.simple_prefix = prefix;
        node.index = None;
    }

    for id in ast.descendants(ast.root()) {
        if !ast.node(id).is_utility() {
            continue;
        }
        let arguments: Vec<NodeId> = ast
            .children(id)
            .iter()
            .copied()
            .filter(|c| ast.node(*c).is_open_vocab())
            .collect();
        for arg_type in ArgType::ALL {
            let same: Vec<NodeId> = arguments
                .iter()
                .copied()
                .filter(|c| ast.node(*c).arg_type == Some(arg_type))
                .collect();
            if same.len() > 1 {
                for (i, c) in same.into_iter().enumerate() {
                    ast.node_mut(c).index = Some(i + 1);
                }
            }
        }
    }
}
