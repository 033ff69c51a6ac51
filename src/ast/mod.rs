//! Abstract Syntax Tree for shell commands
//!
//! A typed tree of utilities, options and arguments joined by pipelines,
//! logic operators, brackets and substitutions.
//!
//! Architecture:
//!   Input → Lexer → Normalizer → AST → Linearizer / Serializer → Output

pub mod types;

pub use types::{Ast, Node, NodeId, NodeKind};
