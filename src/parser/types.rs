//! Parser Types and Constants
//!
//! Shared limits and token predicates used across parser modules.

use crate::parser::lexer::{Token, TokenType};

/// Max nesting of subshells and substitutions before the rest is kept literal
pub const MAX_PARSER_DEPTH: usize = 200;

/// Check if a token type separates commands in a list
pub fn is_list_separator(t: TokenType) -> bool {
    matches!(t, TokenType::Semicolon | TokenType::Amp | TokenType::Newline)
}

/// Check if a token closes a `find -exec` style nested command
pub fn is_exec_terminator(token: &Token) -> bool {
    match token.token_type {
        TokenType::Semicolon => true,
        TokenType::Word => token.value == ";" || token.is_bare("+"),
        _ => false,
    }
}

/// Check if a word should be read as a flag rather than an operand
pub fn looks_like_flag(token: &Token) -> bool {
    if !token.is_word() || token.quoted {
        return false;
    }
    let mut chars = token.value.chars();
    chars.next() == Some('-') && chars.next().is_some()
}

/// Check if the group opening at byte `open_at` closes exactly at the end
/// of `text`
pub fn group_spans_rest(text: &str, open_at: usize) -> bool {
    let mut depth = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open_at) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_single => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '(' if !in_single && !in_double => depth += 1,
            ')' if !in_single && !in_double => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1 == text.len();
                }
            }
            _ => {}
        }
    }
    false
}
