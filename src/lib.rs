//! # Introduction
//!
//! Xene is a small expression-oriented teaching language.  This crate parses
//! Xene programs with a table-driven LALR(1) parser and evaluates them with a
//! tree-walking interpreter under a wall-clock deadline.  A grading harness
//! runs programs against input/expected-output test cases.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → LALR driver (reductions build the AST) → Callable → Context::call
//! ```
//!
//! 1. [`parser`]: the lexer, the grammar and its reductions, the parse
//!    tables, and the shift/reduce driver with error recovery.
//! 2. [`memory`]: runtime [`memory::value::Value`]s and the scope arena that
//!    closures capture by handle.
//! 3. [`interpreter`]: evaluation, built-ins, and [`interpreter::Context`],
//!    which runs each call on a worker thread under a timeout.
//! 4. [`grader`]: the JSON test-case harness.
//! 5. [`ui`]: syntax highlighting and a ratatui viewer; not part of the
//!    stable library API.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//!
//! let value = xene::exec("var_a = 2; var_a++; var_a", Duration::from_secs(1)).unwrap();
//! assert_eq!(value.as_int(), Some(3));
//! ```

pub mod error;
pub mod grader;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod ui;

pub use error::Error;

use interpreter::Context;
use memory::value::Value;
use std::time::Duration;

/// Parse `source` and run it once in a fresh context
pub fn exec(source: &str, timeout: Duration) -> Result<Value, Error> {
    let program = parser::parse(source)?;
    Ok(Context::new(timeout).call(&program, Vec::new())?)
}

/// Like [`exec`], with `input` bound to `input`
pub fn exec_with_input(source: &str, input: Value, timeout: Duration) -> Result<Value, Error> {
    let program = parser::parse(source)?;
    let mut ctx = Context::new(timeout);
    ctx.set_input(input);
    Ok(ctx.call(&program, Vec::new())?)
}
