//! Token definitions shared by the lexer, the parse tables and diagnostics
//!
//! A [`Token`] is immutable once produced: it records the literal text, its
//! [`TokenKind`] and the [`Position`] it was read from.  Token kinds form a
//! closed set whose size is the grammar's terminal count, so terminal sets in
//! the table builder fit in a single `u64` bitmask.

use std::fmt;

/// Position of a token in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the start of the source
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position of the first byte of a source text.
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {})",
            self.line, self.column, self.offset
        )
    }
}

/// Terminal symbols of the grammar.
///
/// The discriminant order is the column order of the action table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Eof,
    /// Reserved pseudo-token shifted by error recovery, never lexed
    Error,
    Int,
    Str,
    True,
    False,
    Var,
    Input,
    FnName,
    CustFnName,
    Function,
    Return,
    If,
    Else,
    While,
    Foreach,
    In,
    Arrow,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Inc,
    Dec,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Dot,
}

impl TokenKind {
    pub const COUNT: usize = 44;

    pub const ALL: [TokenKind; TokenKind::COUNT] = [
        TokenKind::Eof,
        TokenKind::Error,
        TokenKind::Int,
        TokenKind::Str,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Var,
        TokenKind::Input,
        TokenKind::FnName,
        TokenKind::CustFnName,
        TokenKind::Function,
        TokenKind::Return,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::While,
        TokenKind::Foreach,
        TokenKind::In,
        TokenKind::Arrow,
        TokenKind::Assign,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Percent,
        TokenKind::Inc,
        TokenKind::Dec,
        TokenKind::EqEq,
        TokenKind::NotEq,
        TokenKind::Lt,
        TokenKind::LtEq,
        TokenKind::Gt,
        TokenKind::GtEq,
        TokenKind::AndAnd,
        TokenKind::OrOr,
        TokenKind::Bang,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBracket,
        TokenKind::RBracket,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::Comma,
        TokenKind::Semicolon,
        TokenKind::Dot,
    ];

    /// Column index of this kind in the action table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<TokenKind> {
        Self::ALL.get(index).copied()
    }

    /// Token-type name, as used in expected-token lists and by the highlighter.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "$",
            TokenKind::Error => "error",
            TokenKind::Int => "int",
            TokenKind::Str => "string",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Var => "var",
            TokenKind::Input => "input",
            TokenKind::FnName => "fn_name",
            TokenKind::CustFnName => "cust_fn_name",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Foreach => "foreach",
            TokenKind::In => "in",
            TokenKind::Arrow => "->",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
        }
    }

    /// Keyword kind for a reserved word, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "input" => Some(TokenKind::Input),
            "function" => Some(TokenKind::Function),
            "return" => Some(TokenKind::Return),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "foreach" => Some(TokenKind::Foreach),
            "in" => Some(TokenKind::In),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal source text of the token (empty for end of input)
    pub lit: String,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lit: impl Into<String>, pos: Position) -> Self {
        Self {
            kind,
            lit: lit.into(),
            pos,
        }
    }

    pub fn eof(pos: Position) -> Self {
        Self::new(TokenKind::Eof, "", pos)
    }

    /// Byte offset one past the end of the literal
    pub fn end(&self) -> usize {
        self.pos.offset + self.lit.len()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Int => write!(f, "int literal {}", self.lit),
            TokenKind::Str => write!(f, "string literal {}", self.lit),
            TokenKind::Var | TokenKind::FnName | TokenKind::CustFnName => {
                write!(f, "{} '{}'", self.kind.name(), self.lit)
            }
            _ => write!(f, "'{}'", self.lit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_indices_match_table_order() {
        for (i, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(TokenKind::from_index(i), Some(*kind));
        }
        assert!(TokenKind::COUNT <= 64);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(TokenKind::keyword("foreach"), Some(TokenKind::Foreach));
        assert_eq!(TokenKind::keyword("var_a"), None);
        assert_eq!(TokenKind::keyword("abs"), None);
    }
}
