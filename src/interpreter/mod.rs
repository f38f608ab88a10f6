//! Xene evaluation engine
//!
//! This module provides the runtime:
//! - [`context`]: Execution contexts, worker threads and timeouts
//! - [`engine`]: The evaluator and call dispatch
//! - [`errors`]: Runtime error types
//! - [`constants`]: Timeouts and resource limits
//!
//! # Execution Model
//!
//! The evaluator walks the AST recursively.  Statements, loop iterations and
//! calls check the deadline before doing work, so a runaway program ends with
//! a timeout error within one suspension point of its deadline.
//!
//! Statement, loop, expression, operator and built-in evaluation extend
//! [`engine::Interpreter`] from their own files.

pub mod builtins;
pub mod constants;
pub mod context;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod loops;
pub mod ops;
pub mod statements;

pub use context::Context;
pub use errors::RuntimeError;
