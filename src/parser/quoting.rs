//! Quote recovery
//!
//! The lexer strips quotes from words. When quotation recovery is on, words
//! that were quoted in the input get the minimal quoting needed to stay a
//! single, equivalent shell word. This is a best-effort reconstruction, not
//! a byte-exact copy of the input.

use crate::parser::lexer::Token;

/// Check if a string contains only safe characters that don't need quoting.
/// Safe chars: alphanumerics, underscore, slash, dot, colon, hyphen, at, percent, plus, comma, equals
pub fn is_safe_value(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '_' | '/' | '.' | ':' | '-' | '@' | '%' | '+' | ',' | '=')
        })
}

/// Single-quote a value, escaping embedded single quotes as `'\''`.
pub fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Double-quote a value. Expansions (`$x`, `$( )`) stay live.
pub fn double_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Words the normalizer reads differently once their quotes are gone:
/// flags, `--` and the `-exec ... +` terminator.
fn changes_meaning_bare(value: &str) -> bool {
    value.starts_with('-') || value == "+"
}

/// Text to store for a word token.
///
/// Unquoted words keep their text. Quoted words lose their quotes when the
/// content is safe bare, otherwise they are re-quoted in the style the input
/// used: double quotes stay double, single quotes and backslash escapes
/// become single quotes.
pub fn recover_word(token: &Token, recover_quotation: bool) -> String {
    if !token.quoted || !recover_quotation {
        return token.value.clone();
    }
    if is_safe_value(&token.value) && !changes_meaning_bare(&token.value) {
        return token.value.clone();
    }
    if token.raw.starts_with('"') && !token.value.contains('`') {
        double_quote(&token.value)
    } else {
        single_quote(&token.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn word(input: &str) -> Token {
        Lexer::new(input).tokenize().remove(0)
    }

    #[test]
    fn test_safe_values() {
        assert!(is_safe_value("hello"));
        assert!(is_safe_value("/usr/bin"));
        assert!(is_safe_value("a.b.c"));
        assert!(!is_safe_value("*.txt"));
        assert!(!is_safe_value("a b"));
        assert!(!is_safe_value(""));
    }

    #[test]
    fn test_recover_keeps_double_quote_style() {
        assert_eq!(recover_word(&word("\"*.txt\""), true), "\"*.txt\"");
        assert_eq!(recover_word(&word("\"$HOME\"/x"), true), "\"$HOME/x\"");
    }

    #[test]
    fn test_recover_drops_needless_quotes() {
        assert_eq!(recover_word(&word("\"foo\""), true), "foo");
        assert_eq!(recover_word(&word("'a.txt'"), true), "a.txt");
    }

    #[test]
    fn test_recover_keeps_quotes_on_flag_like_words() {
        assert_eq!(recover_word(&word("\"-n\""), true), "\"-n\"");
        assert_eq!(recover_word(&word("'--'"), true), "'--'");
        assert_eq!(recover_word(&word("\"+\""), true), "\"+\"");
        assert_eq!(recover_word(&word("\\-v"), true), "'-v'");
        assert_eq!(recover_word(&word("\"a-b\""), true), "a-b");
    }

    #[test]
    fn test_recover_escapes_become_single_quotes() {
        assert_eq!(recover_word(&word("foo\\ bar"), true), "'foo bar'");
        assert_eq!(recover_word(&word("'it'\\''s'"), true), "'it'\\''s'");
    }

    #[test]
    fn test_recover_empty_string() {
        assert_eq!(recover_word(&word("\"\""), true), "\"\"");
    }

    #[test]
    fn test_no_recovery_returns_bare_text() {
        assert_eq!(recover_word(&word("\"*.txt\""), false), "*.txt");
    }

    #[test]
    fn test_recovered_word_is_stable() {
        for input in ["\"*.txt\"", "'a b'", "x\\ y", "\"a\\\"b\"", "\"-n\"", "'+'"] {
            let once = recover_word(&word(input), true);
            let twice = recover_word(&word(&once), true);
            assert_eq!(once, twice, "unstable for {}", input);
        }
    }
}
