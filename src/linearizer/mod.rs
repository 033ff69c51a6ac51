//! Linearizer
//!
//! Flattens an AST into token streams: the policy-driven token sequence
//! (`ast2tokens`, `ast2template`) and the reversible sentinel encoding
//! (`ast2list`).

pub mod sequence;
pub mod tokens;

pub use sequence::{ast2list, Order};
pub use tokens::{abstract_arguments, abstract_value, ast2template, ast2tokens};
