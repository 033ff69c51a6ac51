//! Linearization Policy
//!
//! The nine independent switches that steer normalization, linearization and
//! serialization, bundled into one immutable value passed by reference
//! through every recursive call. Incoherent combinations are rejected when
//! the policy is built, never during emission.

use serde::Deserialize;

use crate::error::PolicyError;

/// Raw policy switches, as written in a policy file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyFlags {
    /// Re-insert minimal quotes around words that were quoted in the input.
    pub recover_quotation: bool,
    /// Tolerate arity violations instead of failing.
    pub loose_constraints: bool,
    /// Emit a utility's children in lexicographic order of their value.
    pub ignore_flag_order: bool,
    /// Replace open-vocabulary arguments with their type name.
    pub arg_type_only: bool,
    /// Keep frequent arguments literal under `arg_type_only`.
    pub keep_common_args: bool,
    /// Suffix argument tokens with `_<ArgType>`.
    pub with_arg_type: bool,
    /// Render options as `<utility>@@<flag>`.
    pub with_parent: bool,
    /// Suffix indexable arguments with a two-digit ordinal.
    pub index_arg: bool,
    /// Prepend the normalizer's structural prefix to options and arguments.
    pub with_prefix: bool,
}

impl Default for PolicyFlags {
    fn default() -> Self {
        Self {
            recover_quotation: true,
            loose_constraints: false,
            ignore_flag_order: false,
            arg_type_only: false,
            keep_common_args: false,
            with_arg_type: false,
            with_parent: false,
            index_arg: false,
            with_prefix: false,
        }
    }
}

/// Names accepted by [`Policy::preset`].
pub const PRESETS: &[&str] = &["tokens", "template", "command", "sequence", "loose"];

/// A validated, immutable policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    flags: PolicyFlags,
}

impl Policy {
    pub fn new(flags: PolicyFlags) -> Result<Self, PolicyError> {
        if flags.keep_common_args && !flags.arg_type_only {
            return Err(PolicyError::Conflict(
                "keep_common_args requires arg_type_only".to_string(),
            ));
        }
        if flags.with_parent && flags.with_prefix {
            return Err(PolicyError::Conflict(
                "with_parent and with_prefix both qualify option tokens".to_string(),
            ));
        }
        Ok(Self { flags })
    }

    /// Named policies for the common conversions.
    pub fn preset(name: &str) -> Result<Self, PolicyError> {
        let defaults = PolicyFlags::default();
        let flags = match name {
            "tokens" | "command" | "sequence" => defaults,
            "template" => PolicyFlags {
                ignore_flag_order: true,
                arg_type_only: true,
                ..defaults
            },
            "loose" => PolicyFlags {
                loose_constraints: true,
                ..defaults
            },
            other => return Err(PolicyError::UnknownPreset(other.to_string())),
        };
        Self::new(flags)
    }

    /// Parse a policy from TOML; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, PolicyError> {
        let flags: PolicyFlags = toml::from_str(text)?;
        Self::new(flags)
    }

    /// Same policy with `loose_constraints` switched.
    pub fn with_loose(self, loose: bool) -> Self {
        Self {
            flags: PolicyFlags { loose_constraints: loose, ..self.flags },
        }
    }

    /// Same policy with `ignore_flag_order` switched.
    pub fn with_ignore_flag_order(self, ignore: bool) -> Self {
        Self {
            flags: PolicyFlags { ignore_flag_order: ignore, ..self.flags },
        }
    }

    pub fn flags(&self) -> &PolicyFlags {
        &self.flags
    }

    pub fn recover_quotation(&self) -> bool {
        self.flags.recover_quotation
    }

    pub fn loose_constraints(&self) -> bool {
        self.flags.loose_constraints
    }

    pub fn ignore_flag_order(&self) -> bool {
        self.flags.ignore_flag_order
    }

    pub fn arg_type_only(&self) -> bool {
        self.flags.arg_type_only
    }

    pub fn keep_common_args(&self) -> bool {
        self.flags.keep_common_args
    }

    pub fn with_arg_type(&self) -> bool {
        self.flags.with_arg_type
    }

    pub fn with_parent(&self) -> bool {
        self.flags.with_parent
    }

    pub fn index_arg(&self) -> bool {
        self.flags.index_arg
    }

    pub fn with_prefix(&self) -> bool {
        self.flags.with_prefix
    }
}
