//! Grammar Types
//!
//! Argument-type taxonomy and the shapes of per-utility option specs.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Argument types recognized by the grammar.
///
/// Every type except `ReservedWord` is open-vocabulary: the literal value is
/// free text and may be replaced by the type name in template mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ArgType {
    Path,
    Regex,
    Number,
    Permission,
    Size,
    Timespan,
    DateTime,
    File,
    Directory,
    Username,
    Groupname,
    Other,
    /// Fixed literal such as `{}` or a redirection operator.
    ReservedWord,
}

impl ArgType {
    pub const ALL: [ArgType; 13] = [
        ArgType::Path,
        ArgType::Regex,
        ArgType::Number,
        ArgType::Permission,
        ArgType::Size,
        ArgType::Timespan,
        ArgType::DateTime,
        ArgType::File,
        ArgType::Directory,
        ArgType::Username,
        ArgType::Groupname,
        ArgType::Other,
        ArgType::ReservedWord,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "Path",
            Self::Regex => "Regex",
            Self::Number => "Number",
            Self::Permission => "Permission",
            Self::Size => "Size",
            Self::Timespan => "Timespan",
            Self::DateTime => "DateTime",
            Self::File => "File",
            Self::Directory => "Directory",
            Self::Username => "Username",
            Self::Groupname => "Groupname",
            Self::Other => "Other",
            Self::ReservedWord => "ReservedWord",
        }
    }

    /// Marker emitted for this category by the named-entity tagger.
    pub fn entity_marker(&self) -> &'static str {
        match self {
            Self::Path => "_PATH",
            Self::Regex => "_REGEX",
            Self::Number => "_NUMBER",
            Self::Permission => "_PERMISSION",
            Self::Size => "_SIZE",
            Self::Timespan => "_TIMESPAN",
            Self::DateTime => "_DATETIME",
            Self::File => "_FILE",
            Self::Directory => "_DIRECTORY",
            Self::Username => "_USERNAME",
            Self::Groupname => "_GROUPNAME",
            Self::Other => "_OTHER_PATTERN",
            Self::ReservedWord => "_RESERVED",
        }
    }

    pub fn is_open_vocab(&self) -> bool {
        !matches!(self, Self::ReservedWord)
    }

    /// Quantity types keep a leading `+`/`-` when abstracted.
    pub fn is_quantity(&self) -> bool {
        matches!(self, Self::Number | Self::Size | Self::Timespan)
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArgType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown argument type: {}", s))
    }
}

/// What follows a flag on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionArity {
    /// Boolean switch, no argument.
    Flag,
    /// Exactly one argument of the given type.
    Value(ArgType),
    /// A nested command closed by `;` or `+` (`find -exec`).
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub flag: &'static str,
    pub arity: OptionArity,
}

impl OptionSpec {
    pub const fn flag(flag: &'static str) -> Self {
        Self { flag, arity: OptionArity::Flag }
    }

    pub const fn value(flag: &'static str, arg_type: ArgType) -> Self {
        Self { flag, arity: OptionArity::Value(arg_type) }
    }

    pub const fn command(flag: &'static str) -> Self {
        Self { flag, arity: OptionArity::Command }
    }
}

/// Operand placement for unary logic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Associativity {
    /// Operator precedes its operand (`! expr`).
    Right,
    /// Operator follows its operand.
    Left,
}

/// Frequency band a utility falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Top,
    Band20To15,
    Band15To10,
    Other,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Top,
        Frequency::Band20To15,
        Frequency::Band15To10,
        Frequency::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Band20To15 => "20_to_15",
            Self::Band15To10 => "15_to_10",
            Self::Other => "other",
        }
    }
}

/// Static description of one utility.
#[derive(Debug, Clone)]
pub struct UtilitySpec {
    pub name: &'static str,
    pub options: &'static [OptionSpec],
    /// Types of positional arguments in order; the last one repeats.
    pub positional: &'static [ArgType],
    /// First positional word starts a nested command (`xargs`, `sudo`).
    pub takes_command: bool,
    /// Accepts `find`-style logic operators and `\( \)` groups.
    pub logic: bool,
}

impl UtilitySpec {
    pub fn option(&self, flag: &str) -> Option<&'static OptionSpec> {
        self.options.iter().find(|o| o.flag == flag)
    }

    pub fn positional_type(&self, index: usize) -> Option<ArgType> {
        self.positional
            .get(index)
            .or_else(|| self.positional.last())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_type_names_round_trip() {
        for t in ArgType::ALL {
            assert_eq!(t.as_str().parse::<ArgType>().unwrap(), t);
        }
        assert!("Bogus".parse::<ArgType>().is_err());
    }

    #[test]
    fn test_open_vocab_and_quantities() {
        assert!(ArgType::Path.is_open_vocab());
        assert!(!ArgType::ReservedWord.is_open_vocab());
        assert!(ArgType::Size.is_quantity());
        assert!(!ArgType::Regex.is_quantity());
    }

    #[test]
    fn test_positional_type_repeats_last() {
        let spec = UtilitySpec {
            name: "grep",
            options: &[],
            positional: &[ArgType::Regex, ArgType::File],
            takes_command: false,
            logic: false,
        };
        assert_eq!(spec.positional_type(0), Some(ArgType::Regex));
        assert_eq!(spec.positional_type(1), Some(ArgType::File));
        assert_eq!(spec.positional_type(5), Some(ArgType::File));
    }
}
