//! Lexer for Shell Commands
//!
//! The lexer splits a command line into the tokens the normalizer consumes.
//! It handles:
//! - Control operators (`|`, `&&`, `||`, `;`, `&`, parentheses)
//! - Redirection operators, including a leading file descriptor
//! - Words with single quotes, double quotes and backslash escapes
//! - `$( )`, `${ }`, backticks and `<( )` kept whole inside a word
//!
//! Unterminated quotes and groups never fail: the word runs to end of input.

/// Token types for the command lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // End of input
    Eof,

    // Separators
    Newline,
    Semicolon,
    Amp, // &

    // Operators
    Pipe,   // | and |&
    AndAnd, // &&
    OrOr,   // ||

    // Grouping
    LParen, // (
    RParen, // )

    /// Any redirection operator, with its file descriptor glued on (`2>&1`)
    Redirect,

    Word,
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// Text with quotes and escapes removed
    pub value: String,
    /// Source text of the token
    pub raw: String,
    /// Original position in input
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    /// For WORD tokens: quote information
    pub quoted: bool,
    pub single_quoted: bool,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        value: impl Into<String>,
        start: usize,
        end: usize,
        line: usize,
        column: usize,
    ) -> Self {
        let value = value.into();
        Self {
            token_type,
            raw: value.clone(),
            value,
            start,
            end,
            line,
            column,
            quoted: false,
            single_quoted: false,
        }
    }

    pub fn with_quotes(mut self, quoted: bool, single_quoted: bool) -> Self {
        self.quoted = quoted;
        self.single_quoted = single_quoted;
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    pub fn is_word(&self) -> bool {
        self.token_type == TokenType::Word
    }

    /// An unquoted word equal to `text`.
    pub fn is_bare(&self, text: &str) -> bool {
        self.is_word() && !self.quoted && self.value == text
    }
}

/// Control operators, longest first
const CONTROL_OPS: &[(&str, TokenType)] = &[
    ("&&", TokenType::AndAnd),
    ("||", TokenType::OrOr),
    ("|&", TokenType::Pipe),
    ("|", TokenType::Pipe),
    (";", TokenType::Semicolon),
    ("&", TokenType::Amp),
    ("(", TokenType::LParen),
    (")", TokenType::RParen),
];

/// Redirection operators, longest first
const REDIRECT_OPS: &[&str] = &[
    "&>>", "<<<", "<<-", "&>", ">>", ">|", ">&", "<&", "<>", "<<", ">", "<",
];

/// Check if a character is a word boundary (ends a word token)
fn is_word_boundary(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | ';' | '&' | '|' | '(' | ')' | '<' | '>')
}

/// Lexer class
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> Vec<Token> {
        let len = self.input.len();

        while self.pos < len {
            self.skip_whitespace();

            if self.pos >= len {
                break;
            }

            if let Some(token) = self.next_token() {
                self.tokens.push(token);
            }
        }

        // Add EOF token
        self.tokens.push(Token::new(
            TokenType::Eof,
            "",
            self.pos,
            self.pos,
            self.line,
            self.column,
        ));

        self.tokens
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current();
        if let Some(ch) = c {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\\' if self.peek(1) == Some('\n') => {
                    // Line continuation
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        let start_line = self.line;
        let start_column = self.column;
        let start_pos = self.pos;

        let c0 = self.current()?;

        // Comments run to end of line
        if c0 == '#' {
            while let Some(c) = self.current() {
                if c == '\n' {
                    break;
                }
                self.advance();
            }
            return None;
        }

        if c0 == '\n' {
            self.advance();
            return Some(Token::new(
                TokenType::Newline,
                "\n",
                start_pos,
                self.pos,
                start_line,
                start_column,
            ));
        }

        // Process substitution: <( ... ) and >( ... )
        if (c0 == '<' || c0 == '>') && self.peek(1) == Some('(') {
            self.advance();
            self.read_group('(', ')');
            let raw = self.text(start_pos, self.pos);
            return Some(Token::new(
                TokenType::Word,
                raw,
                start_pos,
                self.pos,
                start_line,
                start_column,
            ));
        }

        if let Some(token) = self.read_redirect(start_pos, start_line, start_column) {
            return Some(token);
        }

        for (op, token_type) in CONTROL_OPS {
            if self.starts_with(op) {
                for _ in 0..op.len() {
                    self.advance();
                }
                return Some(Token::new(
                    *token_type,
                    *op,
                    start_pos,
                    self.pos,
                    start_line,
                    start_column,
                ));
            }
        }

        Some(self.read_word(start_pos, start_line, start_column))
    }

    /// Redirection operator with an optional leading fd (`2>`) and a glued
    /// duplication target (`>&1`, `<&-`).
    fn read_redirect(&mut self, start_pos: usize, line: usize, column: usize) -> Option<Token> {
        let mut digits = 0;
        while self.peek(digits).map_or(false, |c| c.is_ascii_digit()) {
            digits += 1;
        }
        let op = REDIRECT_OPS.iter().find(|op| {
            op.chars()
                .enumerate()
                .all(|(i, c)| self.peek(digits + i) == Some(c))
        })?;
        if digits > 0 && op.starts_with('&') {
            return None;
        }
        for _ in 0..digits + op.len() {
            self.advance();
        }
        if op.ends_with('&') {
            while let Some(c) = self.current() {
                if c.is_ascii_digit() || c == '-' {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let raw = self.text(start_pos, self.pos);
        Some(Token::new(TokenType::Redirect, raw, start_pos, self.pos, line, column))
    }

    fn read_word(&mut self, start_pos: usize, line: usize, column: usize) -> Token {
        let mut value = String::new();
        let mut quoted = false;
        let mut single_quoted = false;

        while let Some(c) = self.current() {
            if is_word_boundary(c) {
                break;
            }
            match c {
                '\'' => {
                    quoted = true;
                    single_quoted = true;
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('\'') => break,
                            Some(ch) => value.push(ch),
                            None => {
                                tracing::debug!(line, column, "unterminated single quote");
                                break;
                            }
                        }
                    }
                }
                '"' => {
                    quoted = true;
                    self.advance();
                    self.read_double_quoted(&mut value);
                }
                '\\' => {
                    self.advance();
                    match self.advance() {
                        Some('\n') => {}
                        Some(ch) => {
                            quoted = true;
                            value.push(ch);
                        }
                        None => value.push('\\'),
                    }
                }
                '$' if self.peek(1) == Some('(') => {
                    let from = self.pos;
                    self.advance();
                    self.read_group('(', ')');
                    value.push_str(&self.text(from, self.pos));
                }
                '$' if self.peek(1) == Some('{') => {
                    let from = self.pos;
                    self.advance();
                    self.read_group('{', '}');
                    value.push_str(&self.text(from, self.pos));
                }
                '`' => {
                    let from = self.pos;
                    self.advance();
                    while let Some(ch) = self.advance() {
                        if ch == '`' {
                            break;
                        }
                    }
                    value.push_str(&self.text(from, self.pos));
                }
                _ => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        let raw = self.text(start_pos, self.pos);
        Token::new(TokenType::Word, value, start_pos, self.pos, line, column)
            .with_raw(raw)
            .with_quotes(quoted, single_quoted)
    }

    fn read_double_quoted(&mut self, value: &mut String) {
        loop {
            match self.current() {
                Some('"') => {
                    self.advance();
                    return;
                }
                Some('\\') => {
                    match self.peek(1) {
                        Some(n @ ('"' | '\\' | '$' | '`')) => {
                            value.push(n);
                            self.advance();
                            self.advance();
                        }
                        Some('\n') => {
                            self.advance();
                            self.advance();
                        }
                        _ => {
                            value.push('\\');
                            self.advance();
                        }
                    }
                }
                Some('$') if self.peek(1) == Some('(') => {
                    let from = self.pos;
                    self.advance();
                    self.read_group('(', ')');
                    value.push_str(&self.text(from, self.pos));
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
                None => {
                    tracing::debug!(line = self.line, "unterminated double quote");
                    return;
                }
            }
        }
    }

    /// Consume a balanced `open ... close` group starting at `open`,
    /// skipping over quoted text inside it.
    fn read_group(&mut self, open: char, close: char) {
        let mut depth = 0usize;
        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    self.advance();
                }
                '\'' => {
                    while let Some(ch) = self.advance() {
                        if ch == '\'' {
                            break;
                        }
                    }
                }
                '"' => {
                    while let Some(ch) = self.advance() {
                        if ch == '\\' {
                            self.advance();
                        } else if ch == '"' {
                            break;
                        }
                    }
                }
                _ if c == open => depth += 1,
                _ if c == close => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
        tracing::debug!(line = self.line, "unterminated '{}' group", open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize()
    }

    #[test]
    fn test_simple_command() {
        let tokens = lex("echo hello");
        assert_eq!(tokens.len(), 3); // echo, hello, EOF
        assert_eq!(tokens[0].token_type, TokenType::Word);
        assert_eq!(tokens[0].value, "echo");
        assert_eq!(tokens[1].value, "hello");
        assert_eq!(tokens[2].token_type, TokenType::Eof);
    }

    #[test]
    fn test_pipeline_and_logic() {
        let tokens = lex("cat file | grep pattern && ls || pwd");
        assert_eq!(tokens[2].token_type, TokenType::Pipe);
        assert_eq!(tokens[5].token_type, TokenType::AndAnd);
        assert_eq!(tokens[7].token_type, TokenType::OrOr);
    }

    #[test]
    fn test_double_quotes() {
        let tokens = lex("echo \"hello world\"");
        assert_eq!(tokens[1].value, "hello world");
        assert_eq!(tokens[1].raw, "\"hello world\"");
        assert!(tokens[1].quoted);
        assert!(!tokens[1].single_quoted);
    }

    #[test]
    fn test_single_quotes() {
        let tokens = lex("echo 'hello world'");
        assert_eq!(tokens[1].value, "hello world");
        assert!(tokens[1].quoted);
        assert!(tokens[1].single_quoted);
    }

    #[test]
    fn test_escaped_semicolon_is_a_word() {
        let tokens = lex("find . -exec rm {} \\;");
        let last = &tokens[tokens.len() - 2];
        assert_eq!(last.token_type, TokenType::Word);
        assert_eq!(last.value, ";");
        assert_eq!(last.raw, "\\;");
        assert!(last.quoted);
    }

    #[test]
    fn test_command_substitution_stays_in_word() {
        let tokens = lex("echo $(ls -l | wc -l) done");
        assert_eq!(tokens[1].value, "$(ls -l | wc -l)");
        assert_eq!(tokens[2].value, "done");
    }

    #[test]
    fn test_process_substitution() {
        let tokens = lex("diff <(ls a) <(ls b)");
        assert_eq!(tokens[1].token_type, TokenType::Word);
        assert_eq!(tokens[1].value, "<(ls a)");
        assert_eq!(tokens[2].value, "<(ls b)");
    }

    #[test]
    fn test_redirections() {
        let tokens = lex("ls > out.txt 2>&1");
        assert_eq!(tokens[1].token_type, TokenType::Redirect);
        assert_eq!(tokens[1].value, ">");
        assert_eq!(tokens[2].value, "out.txt");
        assert_eq!(tokens[3].token_type, TokenType::Redirect);
        assert_eq!(tokens[3].value, "2>&1");
    }

    #[test]
    fn test_number_word_is_not_redirect() {
        let tokens = lex("head -n 10 file");
        assert_eq!(tokens[2].token_type, TokenType::Word);
        assert_eq!(tokens[2].value, "10");
    }

    #[test]
    fn test_unterminated_quote_is_tolerated() {
        let tokens = lex("echo 'abc");
        assert_eq!(tokens[1].value, "abc");
        assert_eq!(tokens.last().unwrap().token_type, TokenType::Eof);
    }

    #[test]
    fn test_comment_skipped() {
        let tokens = lex("ls # list files");
        assert_eq!(tokens.len(), 2);
    }
}
