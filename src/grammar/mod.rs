//! Grammar module
//!
//! Static utility, option and argument-type knowledge consulted by the
//! normalizer, the linearizer and the classifiers.

pub mod types;
pub mod registry;

pub use types::{ArgType, Associativity, Frequency, OptionArity, OptionSpec, UtilitySpec};
