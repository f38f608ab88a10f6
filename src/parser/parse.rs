//! Main parser coordinator
//!
//! This module provides the [`Parser`] driver, its error type, and the
//! [`parse`] and [`tokens`] entry points.
//!
//! # Parser Architecture
//!
//! The Parser is table driven:
//! - `tables`: LALR(1) action/goto tables, built once per process
//! - `grammar`: productions and their reduction functions
//! - This module: the shift/reduce/goto loop and error recovery
//!
//! # Error Recovery
//!
//! On a missing action the driver records a [`ParseError`], unwinds the stack
//! to the nearest state that can shift the `error` pseudo-token, shifts it,
//! and discards input until the lookahead has an action again.  Recovery
//! only lets the parser report further errors; a parse that needed recovery
//! still fails with its first error.

use super::ast::{Body, FunctionDef, Stmt};
use super::grammar::{Attrib, Reduction, Slot, MAX_NESTING, PRODUCTIONS};
use super::lexer::{LexError, Lexer};
use super::tables::{tables, Action};
use super::token::{Position, Token, TokenKind};
use crate::memory::value::{Callable, Closure, Value};
use std::fmt;
use std::sync::Arc;

/// Errors collected beyond this count end the parse
const MAX_ERRORS: usize = 16;

/// Category of a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The lexer rejected the input
    Lex,
    /// No action for the lookahead token
    Syntax,
    /// A reduction function rejected its operands
    Semantic,
}

/// Parser error type
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The lookahead token when the error was detected
    pub token: Token,
    pub position: Position,
    /// Stack attributes discarded while searching for a recovery state
    pub error_symbols: Vec<Attrib>,
    /// Names of the token types that had an action at the failing state
    pub expected_tokens: Vec<String>,
    pub message: String,
}

impl ParseError {
    fn lex(err: LexError) -> Self {
        ParseError {
            kind: ParseErrorKind::Lex,
            token: Token::eof(err.position),
            position: err.position,
            error_symbols: Vec::new(),
            expected_tokens: Vec::new(),
            message: err.message,
        }
    }

    fn syntax(token: Token, expected: Vec<TokenKind>) -> Self {
        ParseError {
            kind: ParseErrorKind::Syntax,
            position: token.pos,
            message: format!("unexpected {}", token),
            token,
            error_symbols: Vec::new(),
            expected_tokens: expected.iter().map(|k| k.name().to_string()).collect(),
        }
    }

    fn semantic(message: String, token: Token, position: Position) -> Self {
        ParseError {
            kind: ParseErrorKind::Semantic,
            token,
            position,
            error_symbols: Vec::new(),
            expected_tokens: Vec::new(),
            message,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            ParseErrorKind::Lex => "Lexer error",
            ParseErrorKind::Syntax => "Syntax error",
            ParseErrorKind::Semantic => "Semantic error",
        };
        write!(
            f,
            "{} at line {}, column {}: {}",
            label, self.position.line, self.position.column, self.message
        )?;
        if !self.expected_tokens.is_empty() {
            write!(f, " (expected one of: {})", self.expected_tokens.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::lex(err)
    }
}

/// Pull interface the driver reads tokens through
pub trait Scanner {
    fn next_token(&mut self) -> Result<Token, LexError>;

    /// Full source text, shared with the functions the parse produces
    fn source(&self) -> &Arc<str>;
}

impl Scanner for Lexer {
    fn next_token(&mut self) -> Result<Token, LexError> {
        Lexer::next_token(self)
    }

    fn source(&self) -> &Arc<str> {
        Lexer::source(self)
    }
}

/// Parallel state and attribute stacks, always the same length
#[derive(Debug, Default)]
pub(crate) struct Stack {
    states: Vec<usize>,
    slots: Vec<Slot>,
}

impl Stack {
    pub(crate) fn reset(&mut self) {
        self.states.clear();
        self.slots.clear();
        self.push(
            0,
            Slot {
                attrib: Attrib::Empty,
                start: Position::start(),
                end: 0,
                depth: 0,
            },
        );
    }

    pub(crate) fn push(&mut self, state: usize, slot: Slot) {
        self.states.push(state);
        self.slots.push(slot);
    }

    pub(crate) fn top(&self) -> usize {
        self.states.last().copied().unwrap_or(0)
    }

    pub(crate) fn state_at(&self, depth: usize) -> usize {
        self.states[depth]
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    /// Remove the top `n` entries, returning their slots bottom first
    pub(crate) fn pop_n(&mut self, n: usize) -> Vec<Slot> {
        let keep = self.len() - n;
        self.truncate(keep)
    }

    /// Shrink the stack to `len` entries, returning the removed slots bottom first
    pub(crate) fn truncate(&mut self, len: usize) -> Vec<Slot> {
        self.states.truncate(len);
        self.slots.split_off(len)
    }
}

/// Table-driven LALR(1) parser
pub struct Parser<S: Scanner = Lexer> {
    scanner: S,
    stack: Stack,
    errors: Vec<ParseError>,
    /// Offset of the lookahead at the most recent syntax error
    last_error_offset: Option<usize>,
}

impl Parser<Lexer> {
    pub fn new(source: &str) -> Self {
        Self::with_scanner(Lexer::new(source))
    }
}

impl<S: Scanner> Parser<S> {
    pub fn with_scanner(scanner: S) -> Self {
        tables();
        Parser {
            scanner,
            stack: Stack::default(),
            errors: Vec::new(),
            last_error_offset: None,
        }
    }

    /// Every error found by the last parse, in source order
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse the whole input into the program's statement list
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        match self.parse()? {
            Attrib::Stmts(stmts) => Ok(stmts),
            other => unreachable!("program reduced to {:?}", other),
        }
    }

    /// Run the automaton to acceptance, returning the start symbol's attribute
    pub fn parse(&mut self) -> Result<Attrib, ParseError> {
        let tables = tables();
        self.stack.reset();
        self.errors.clear();
        self.last_error_offset = None;

        let mut token = self.advance()?;
        loop {
            match tables.action(self.stack.top(), token.kind) {
                Some(Action::Shift(next)) => {
                    let slot = Slot {
                        start: token.pos,
                        end: token.end(),
                        attrib: Attrib::Token(token),
                        depth: 0,
                    };
                    self.stack.push(next, slot);
                    token = self.advance()?;
                }
                Some(Action::Reduce(production)) => self.reduce(production, &token)?,
                Some(Action::Accept) => {
                    let mut slots = self.stack.pop_n(1);
                    return match self.errors.first() {
                        Some(first) => Err(first.clone()),
                        None => Ok(slots.pop().map_or(Attrib::Empty, |s| s.attrib)),
                    };
                }
                None => token = self.recover(token)?,
            }
        }
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        match self.scanner.next_token() {
            Ok(token) => Ok(token),
            Err(e) => {
                self.errors.push(ParseError::lex(e));
                Err(self.first_error())
            }
        }
    }

    fn first_error(&self) -> ParseError {
        self.errors[0].clone()
    }

    fn reduce(&mut self, production: usize, lookahead: &Token) -> Result<(), ParseError> {
        let prod = &PRODUCTIONS[production];
        let slots = self.stack.pop_n(prod.arity());
        let (start, end) = match (slots.first(), slots.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (lookahead.pos, lookahead.pos.offset),
        };

        let deepest = slots.iter().map(|slot| slot.depth).max().unwrap_or(0);
        let depth = deepest + usize::from(prod.nests());
        if depth > MAX_NESTING {
            let message = format!("nesting deeper than {} levels", MAX_NESTING);
            self.errors
                .push(ParseError::semantic(message, lookahead.clone(), start));
            return Err(self.first_error());
        }

        let mut reduction = Reduction::new(slots, start, end, self.scanner.source());
        let attrib = match (prod.reduce)(&mut reduction) {
            Ok(attrib) => attrib,
            Err(message) => {
                self.errors
                    .push(ParseError::semantic(message, lookahead.clone(), start));
                return Err(self.first_error());
            }
        };

        let state = self.stack.top();
        let Some(next) = tables().goto(state, prod.lhs) else {
            panic!("no goto from state {} on {:?}", state, prod.lhs);
        };
        self.stack.push(
            next,
            Slot {
                attrib,
                start,
                end,
                depth,
            },
        );
        Ok(())
    }

    /// Record a syntax error at `token` and resynchronize.
    ///
    /// Returns the lookahead to continue with, or the first recorded error
    /// when no recovery is possible.
    fn recover(&mut self, token: Token) -> Result<Token, ParseError> {
        let tables = tables();
        let repeated = self.last_error_offset == Some(token.pos.offset);
        self.last_error_offset = Some(token.pos.offset);

        let mut error = ParseError::syntax(token.clone(), tables.expected(self.stack.top()));
        let recovery = (0..self.stack.len())
            .rev()
            .find(|&depth| tables.can_recover(self.stack.state_at(depth)));

        let Some(depth) = recovery else {
            self.errors.push(error);
            return Err(self.first_error());
        };
        error.error_symbols = self
            .stack
            .truncate(depth + 1)
            .into_iter()
            .map(|slot| slot.attrib)
            .collect();
        if !repeated {
            self.errors.push(error);
        }
        if self.errors.len() >= MAX_ERRORS {
            return Err(self.first_error());
        }

        let Some(Action::Shift(next)) = tables.action(self.stack.top(), TokenKind::Error) else {
            panic!("recovery state {} cannot shift error", self.stack.top());
        };
        self.stack.push(
            next,
            Slot {
                attrib: Attrib::Error,
                start: token.pos,
                end: token.pos.offset,
                depth: 0,
            },
        );

        // A second failure on the same token means recovery made no
        // progress; drop the token before resynchronizing.
        let mut token = token;
        if repeated {
            if token.kind == TokenKind::Eof {
                return Err(self.first_error());
            }
            token = self.advance()?;
        }
        loop {
            if tables.action(self.stack.top(), token.kind).is_some() {
                return Ok(token);
            }
            if token.kind == TokenKind::Eof {
                return Err(self.first_error());
            }
            token = self.advance()?;
        }
    }
}

/// Parse a program into its function definition
pub fn parse_function(source: &str) -> Result<Arc<FunctionDef>, ParseError> {
    let shared: Arc<str> = Arc::from(source);
    let mut parser = Parser::with_scanner(Lexer::from_shared(Arc::clone(&shared)));
    let body = parser.parse_program()?;
    Ok(Arc::new(FunctionDef {
        params: Vec::new(),
        body: Body::Block(body),
        span: 0..shared.len(),
        source: shared,
        location: Position::start(),
    }))
}

/// Compile source text into an executable value: a parameterless callable
pub fn parse(source: &str) -> Result<Value, ParseError> {
    let def = parse_function(source)?;
    Ok(Value::Callable(Callable::Closure(Closure::new(def, None))))
}

/// Lazy token stream of a callable's source text.
///
/// Built-ins and bound methods have no source and yield nothing.  The stream
/// is one-shot and ends at end of input.
pub struct Tokens {
    lexer: Option<Lexer>,
}

impl Iterator for Tokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.lexer.as_mut()?.next() {
            Some(Ok(token)) => Some(token),
            _ => {
                self.lexer = None;
                None
            }
        }
    }
}

/// Tokens backing a parsed callable
pub fn tokens(callable: &Callable) -> Tokens {
    let lexer = match callable {
        Callable::Closure(closure) => Some(Lexer::with_span(
            Arc::clone(&closure.def.source),
            closure.def.span.clone(),
        )),
        Callable::Builtin(_) | Callable::Method { .. } => None,
    };
    Tokens { lexer }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_error(source: &str) -> ParseError {
        let err = Parser::new(source).parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax, "{}", err);
        err
    }

    #[test]
    fn test_empty_program() {
        assert!(Parser::new("").parse_program().unwrap().is_empty());
        assert!(Parser::new(" ;; ").parse().is_err());
    }

    #[test]
    fn test_statements() {
        let stmts = Parser::new("var_a = 1; var_a++; if var_a > 1 { var_a } else { 0 } var_a")
            .parse_program()
            .unwrap();
        assert_eq!(stmts.len(), 4);
    }

    #[test]
    fn test_double_bang_is_syntax_error() {
        let err = syntax_error("!!true");
        assert_eq!(err.token.kind, TokenKind::Bang);
        assert_eq!(err.position.offset, 1);
        assert!(err.expected_tokens.contains(&"(".to_string()));
        assert!(!err.expected_tokens.contains(&"!".to_string()));
    }

    #[test]
    fn test_recovery_collects_every_error() {
        let mut parser = Parser::new("var_a = ; var_b = 2; var_c = )");
        let err = parser.parse().unwrap_err();
        assert_eq!(err.position.offset, 8);
        assert_eq!(parser.errors().len(), 2);
        assert!(!parser.errors()[0].error_symbols.is_empty());
    }

    #[test]
    fn test_unbalanced_brace_terminates() {
        let mut parser = Parser::new("} } var_a");
        assert!(parser.parse().is_err());
        assert!(parser.errors().len() <= MAX_ERRORS);
    }

    #[test]
    fn test_semantic_errors() {
        for source in ["1---1", "[1]++", "[1].length--", "(var_a)++", "[1, 2][2]", "nope(1)"] {
            let err = Parser::new(source).parse().unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::Semantic, "{}: {}", source, err);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| format!("{}1{}", "(".repeat(levels), ")".repeat(levels));
        assert!(Parser::new(&nested(MAX_NESTING - 1)).parse().is_ok());

        let err = Parser::new(&nested(200_000)).parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Semantic);
        assert!(err.message.contains("nesting"), "{}", err);

        let chain = vec!["1"; MAX_NESTING + 2].join(" + ");
        assert_eq!(Parser::new(&chain).parse().unwrap_err().kind, ParseErrorKind::Semantic);
    }

    #[test]
    fn test_lex_error() {
        let err = Parser::new("var_a = 1 @ 2").parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Lex);
        assert_eq!(err.position.offset, 10);
    }

    #[test]
    fn test_tokens_of_program() {
        let program = parse("var_a = 2; var_a++").unwrap();
        let Value::Callable(callable) = program else {
            panic!("program should be callable");
        };
        let lits: Vec<String> = tokens(&callable).map(|t| t.lit).collect();
        assert_eq!(lits, vec!["var_a", "=", "2", ";", "var_a", "++"]);
    }
}
