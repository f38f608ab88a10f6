//! Loop statement execution (`while`, `foreach`).
//!
//! Adds `impl Interpreter` methods for the two loop forms.  Each iteration is
//! a suspension point, so an unbounded loop ends with a timeout error instead
//! of running past its deadline.
//!
//! `return` inside a loop body is reported as [`LoopBodyResult::Exit`], which
//! makes the loop unwind immediately and leaves the pending return for the
//! enclosing call.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, Stmt};
use crate::parser::token::Position;

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally; the loop should iterate again.
    Continue,
    /// `return` was executed; the loop should unwind.
    Exit,
}

impl Interpreter {
    pub(crate) fn execute_loop_body(&mut self, body: &[Stmt]) -> Result<LoopBodyResult, RuntimeError> {
        self.execute_block(body)?;
        if self.control_flow == ControlFlow::Normal {
            Ok(LoopBodyResult::Continue)
        } else {
            Ok(LoopBodyResult::Exit)
        }
    }

    /// Executes a `while condition { body }` loop.
    pub(crate) fn execute_while(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
        location: Position,
    ) -> Result<(), RuntimeError> {
        loop {
            self.checkpoint()?;
            if !self.evaluate_condition(condition, location)? {
                return Ok(());
            }
            if let LoopBodyResult::Exit = self.execute_loop_body(body)? {
                return Ok(());
            }
        }
    }

    /// Executes a `foreach var in iterable { body }` loop.
    ///
    /// Lists are iterated over a snapshot taken before the first iteration,
    /// strings over their characters.  Every iteration binds `var` in a scope
    /// of its own.
    pub(crate) fn execute_foreach(
        &mut self,
        var: &str,
        iterable: &Expr,
        body: &[Stmt],
        location: Position,
    ) -> Result<(), RuntimeError> {
        let items = match self.evaluate_expr(iterable)? {
            Value::List(list) => list.snapshot(),
            Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
            other => {
                return Err(RuntimeError::type_error(
                    "list or string",
                    other.type_name(),
                    location,
                ))
            }
        };

        for item in items {
            self.checkpoint()?;
            let scope = self.arena.push(self.scope);
            self.arena.define(scope, var, item);
            let saved_scope = std::mem::replace(&mut self.scope, scope);
            let result = self.execute_loop_body(body);
            self.scope = saved_scope;
            self.arena.release(scope);
            if let LoopBodyResult::Exit = result? {
                break;
            }
        }
        Ok(())
    }
}
