//! Xene source code parser
//!
//! This module transforms Xene source text into an executable value:
//! - [`token`]: Token kinds and positions
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`grammar`]: Productions and reduction functions (tokens → AST)
//! - [`tables`]: LALR(1) action/goto tables derived from the grammar
//! - [`parse`]: The table-driven driver with error recovery
//! - [`ast`]: AST node definitions
//!
//! # Parser Implementation
//!
//! Bottom-up LALR(1).  The tables are computed from the production list once
//! per process and shared read-only by every parser; no generator runs at
//! build time.

pub mod ast;
pub mod grammar;
pub mod lexer;
pub mod parse;
pub mod tables;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use parse::{parse, parse_function, tokens, ParseError, ParseErrorKind, Parser, Tokens};
pub use token::{Position, Token, TokenKind};
