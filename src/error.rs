//! Error Types
//!
//! - `MalformedInput`: recoverable; recorded by the normalizer, never returned
//! - `LinearizeError`: strict-mode contract violations and unsupported features
//! - `PolicyError`: rejected policy configurations, raised at construction

use thiserror::Error;

use crate::ast::NodeKind;

/// Input the normalizer could not interpret and kept as a literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed input near '{token}': {reason}")]
pub struct MalformedInput {
    pub token: String,
    pub reason: String,
}

impl MalformedInput {
    pub fn new(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// Expected child count of a node kind under the strict grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn admits(&self, n: usize) -> bool {
        match *self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "exactly {}", k),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinearizeError {
    #[error("{kind} node '{value}' expects {expected} children, found {found}")]
    ArityViolation {
        kind: NodeKind,
        value: String,
        expected: Arity,
        found: usize,
    },

    #[error("option '{0}' is not attached to a parent")]
    DetachedOption(String),

    #[error("not supported: {0}")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("unknown policy preset: {0}")]
    UnknownPreset(String),

    #[error("conflicting policy flags: {0}")]
    Conflict(String),

    #[error("invalid policy file: {0}")]
    Config(#[from] toml::de::Error),
}
