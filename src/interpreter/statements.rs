//! Statement execution
//!
//! Adds `impl Interpreter` methods for statement lists and the individual
//! statement forms.  Executing a statement yields the value it produced, if
//! any: expression statements produce their value, `if` produces the value
//! of the branch it took, loops and `return` produce none.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, Stmt};
use crate::parser::token::Position;

impl Interpreter {
    /// Execute statements in order, stopping early on `return`.
    ///
    /// Returns the value of the last statement that produced one.
    pub(crate) fn execute_block(&mut self, stmts: &[Stmt]) -> Result<Option<Value>, RuntimeError> {
        let mut last = None;
        for stmt in stmts {
            self.checkpoint()?;
            let value = self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                return Ok(None);
            }
            if value.is_some() {
                last = value;
            }
        }
        Ok(last)
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<Option<Value>, RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => self.evaluate_expr(expr).map(Some),

            Stmt::Return(expr, _) => {
                let value = self.evaluate_expr(expr)?;
                self.return_value = Some(value);
                self.control_flow = ControlFlow::Return;
                Ok(None)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                location,
            } => {
                if self.evaluate_condition(condition, *location)? {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(None)
                }
            }

            Stmt::While {
                condition,
                body,
                location,
            } => {
                self.execute_while(condition, body, *location)?;
                Ok(None)
            }

            Stmt::Foreach {
                var,
                iterable,
                body,
                location,
            } => {
                self.execute_foreach(var, iterable, body, *location)?;
                Ok(None)
            }
        }
    }

    /// Evaluate an `if`/`while` condition, which must be a boolean
    pub(crate) fn evaluate_condition(
        &mut self,
        condition: &Expr,
        location: Position,
    ) -> Result<bool, RuntimeError> {
        let value = self.evaluate_expr(condition)?;
        value
            .as_bool()
            .ok_or_else(|| RuntimeError::type_error("bool", value.type_name(), location))
    }
}
