//! bashlint - shell command normalization and linearization
//!
//! This library parses one-line shell commands into a canonical, typed AST
//! and converts that tree to token streams, templates, reversible sentinel
//! sequences and back to shell syntax.

pub mod ast;
pub mod bash;
pub mod classify;
pub mod error;
pub mod grammar;
pub mod linearizer;
pub mod parser;
pub mod policy;
pub mod serializer;

pub use ast::types::*;
pub use bash::{bash_parser, bash_tokenizer, char_tokenizer, cmd2template, Bash, BashOptions};
pub use classify::{categorize_utilities, fill_default_value, get_utilities, is_low_frequency, is_simple};
pub use error::{Arity, LinearizeError, MalformedInput, PolicyError};
pub use grammar::{ArgType, Associativity};
pub use linearizer::{ast2list, ast2template, ast2tokens, Order};
pub use parser::{list2ast, normalize_ast, paren_parser, Normalizer};
pub use policy::{Policy, PolicyFlags};
pub use serializer::ast2command;
