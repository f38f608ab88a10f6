//! Lexer (tokenizer) for Xene source code
//!
//! The lexer is pull-based: each call to [`Lexer::next_token`] produces the
//! next [`Token`], ending with a distinguished [`TokenKind::Eof`] token that is
//! returned again on every later call.  The sequence is forward-only and cannot
//! be restarted; create a new lexer to scan again.
//!
//! Operators are matched by maximal munch: the two-character spellings are
//! tried before the one-character ones, so `a---1` lexes as `a -- - 1`.

use super::token::{Position, Token, TokenKind};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Operator spellings, longest first.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("->", TokenKind::Arrow),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("=", TokenKind::Assign),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Bang),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (",", TokenKind::Comma),
    (";", TokenKind::Semicolon),
    (".", TokenKind::Dot),
];

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.position.line, self.position.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for Xene source code
#[derive(Debug, Clone)]
pub struct Lexer {
    source: Arc<str>,
    position: usize,
    end: usize,
    line: usize,
    column: usize,
    /// Set once end of input or an error has been reported through the iterator
    exhausted: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(source: &str) -> Self {
        Self::from_shared(Arc::from(source))
    }

    /// Create a lexer over an already shared source text.
    pub fn from_shared(source: Arc<str>) -> Self {
        let end = source.len();
        Self {
            source,
            position: 0,
            end,
            line: 1,
            column: 1,
            exhausted: false,
        }
    }

    /// Create a lexer that scans only `span` of `source`.
    ///
    /// Token positions stay absolute with respect to the whole source.
    pub fn with_span(source: Arc<str>, span: Range<usize>) -> Self {
        let end = span.end.min(source.len());
        let start = span.start.min(end);
        let mut line = 1;
        let mut column = 1;
        for ch in source[..start].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            source,
            position: start,
            end,
            line,
            column,
            exhausted: false,
        }
    }

    /// The full source text this lexer reads from.
    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    /// Tokenize the remaining input, including the final end-of-input token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let pos = self.current_position();
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(Token::eof(pos)),
        };

        match ch {
            '"' => self.string_literal(pos),
            '0'..='9' => self.number_literal(pos),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(pos)),
            _ => self.operator(pos, ch),
        }
    }

    /// Match the longest operator spelling at the current position
    fn operator(&mut self, pos: Position, ch: char) -> Result<Token, LexError> {
        let matched = OPERATORS
            .iter()
            .find(|(spelling, _)| self.rest().starts_with(spelling));

        if let Some((spelling, kind)) = matched {
            for _ in 0..spelling.len() {
                self.advance();
            }
            return Ok(Token::new(*kind, *spelling, pos));
        }

        Err(LexError {
            message: format!("Unexpected character: '{}'", ch),
            position: pos,
        })
    }

    /// Lex a string literal; the token keeps the quoted, escaped spelling
    fn string_literal(&mut self, pos: Position) -> Result<Token, LexError> {
        self.advance(); // opening quote

        while let Some(ch) = self.advance() {
            match ch {
                '"' => {
                    let lit = &self.source[pos.offset..self.position];
                    return Ok(Token::new(TokenKind::Str, lit, pos));
                }
                '\\' => {
                    let escape_pos = self.current_position();
                    match self.advance() {
                        Some('n' | 't' | 'r' | '\\' | '"' | '0') => {}
                        Some(other) => {
                            return Err(LexError {
                                message: format!("Unknown escape sequence: \\{}", other),
                                position: escape_pos,
                            });
                        }
                        None => break,
                    }
                }
                _ => {}
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            position: pos,
        })
    }

    fn number_literal(&mut self, pos: Position) -> Result<Token, LexError> {
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }

        let lit = &self.source[pos.offset..self.position];
        if lit.parse::<i64>().is_err() {
            return Err(LexError {
                message: format!("Integer literal out of range: {}", lit),
                position: pos,
            });
        }

        Ok(Token::new(TokenKind::Int, lit, pos))
    }

    /// Identifiers are classified by prefix: `var_` variables, `fn_` user
    /// function slots, everything else names a built-in or a member.
    fn identifier_or_keyword(&mut self, pos: Position) -> Token {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || ch == '_') {
            self.advance();
        }

        let word = &self.source[pos.offset..self.position];
        let kind = if let Some(keyword) = TokenKind::keyword(word) {
            keyword
        } else if word.starts_with("var_") {
            TokenKind::Var
        } else if word.starts_with("fn_") {
            TokenKind::CustFnName
        } else {
            TokenKind::FnName
        };

        Token::new(kind, word, pos)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.rest().starts_with("//") => {
                    while let Some(ch) = self.advance() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn rest(&self) -> &str {
        &self.source[self.position..self.end]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn current_position(&self) -> Position {
        Position::new(self.position, self.line, self.column)
    }
}

/// Lazy token stream without the end-of-input token.
///
/// A lexical error is yielded once, after which the stream is closed.
impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => {
                self.exhausted = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new("var_a = -3; return var_a").tokenize().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Var);
        assert_eq!(tokens[0].lit, "var_a");
        assert_eq!(tokens[1].kind, TokenKind::Assign);
        assert_eq!(tokens[2].kind, TokenKind::Minus);
        assert_eq!(tokens[3].kind, TokenKind::Int);
        assert_eq!(tokens[3].lit, "3");
        assert_eq!(tokens[4].kind, TokenKind::Semicolon);
        assert_eq!(tokens[5].kind, TokenKind::Return);
        assert_eq!(tokens[6].kind, TokenKind::Var);
        assert_eq!(tokens[7].kind, TokenKind::Eof);
    }

    #[test]
    fn test_maximal_munch() {
        use TokenKind::*;
        assert_eq!(kinds("var_a---1"), vec![Var, Dec, Minus, Int, Eof]);
        assert_eq!(kinds("1---1"), vec![Int, Dec, Minus, Int, Eof]);
        assert_eq!(kinds("1--1"), vec![Int, Dec, Int, Eof]);
        assert_eq!(kinds("1 - -1"), vec![Int, Minus, Minus, Int, Eof]);
        assert_eq!(kinds("!!true"), vec![Bang, Bang, True, Eof]);
        assert_eq!(kinds("a->b"), vec![FnName, Arrow, FnName, Eof]);
        assert_eq!(kinds("<= < >= > == = !="), vec![LtEq, Lt, GtEq, Gt, EqEq, Assign, NotEq, Eof]);
    }

    #[test]
    fn test_identifier_classes() {
        use TokenKind::*;
        assert_eq!(
            kinds("var_x fn_sum abs input function foreach in"),
            vec![Var, CustFnName, FnName, Input, Function, Foreach, In, Eof]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("var_a\n  ++").tokenize().unwrap();
        assert_eq!(tokens[1].pos, Position::new(8, 2, 3));
        assert_eq!(tokens[1].end(), 10);
    }

    #[test]
    fn test_string_literal_keeps_spelling() {
        let tokens = Lexer::new(r#""a\"b""#).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].lit, r#""a\"b""#);
    }

    #[test]
    fn test_comments_skipped() {
        use TokenKind::*;
        assert_eq!(kinds("1 // one\n/ 2"), vec![Int, Slash, Int, Eof]);
    }

    #[test]
    fn test_lex_errors() {
        assert!(Lexer::new("var_a & 1").tokenize().is_err());
        assert!(Lexer::new("\"open").tokenize().is_err());
        assert!(Lexer::new("99999999999999999999").tokenize().is_err());
        assert!(Lexer::new("\"\\q\"").tokenize().is_err());
    }

    #[test]
    fn test_eof_repeats_and_iterator_closes() {
        let mut lexer = Lexer::new("1");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Int);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);

        let lits: Vec<String> = Lexer::new("1 + 2").map(|t| t.unwrap().lit).collect();
        assert_eq!(lits, vec!["1", "+", "2"]);
    }

    #[test]
    fn test_span_lexing() {
        let source: Arc<str> = Arc::from("var_a = 1;\nvar_b = 2");
        let tokens: Vec<Token> = Lexer::with_span(source, 11..16)
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].lit, "var_b");
        assert_eq!(tokens[0].pos, Position::new(11, 2, 1));
    }
}
