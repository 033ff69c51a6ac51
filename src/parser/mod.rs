//! Parser module for shell commands
//!
//! The lexer, the normalizer that builds canonical ASTs from command text,
//! the parenthesized-expression parser and the sentinel sequence decoder.

pub mod types;
pub mod lexer;
pub mod quoting;
pub mod normalizer;
pub mod paren_parser;
pub mod sequence;

// Re-exports
pub use lexer::{Lexer, Token, TokenType};
pub use normalizer::{normalize_ast, Normalizer};
pub use paren_parser::paren_parser;
pub use sequence::{list2ast, H_NO_EXPAND, NO_EXPAND};
