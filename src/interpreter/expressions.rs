//! Expression evaluation implementation
//!
//! This module dispatches every expression form to its evaluator:
//!
//! - Literals (integers, strings, booleans, list literals)
//! - Variables and the `input` binding
//! - Unary, binary and assignment operators (see `ops`)
//! - Indexing, member access and calls
//! - Function literals, which capture the current scope
//!
//! Operands are evaluated left to right, and every side effect of an operand
//! is committed before the next operand is evaluated.

use crate::interpreter::constants::MAX_EVAL_DEPTH;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{Callable, Value};
use crate::parser::ast::*;
use crate::parser::token::Position;

impl Interpreter {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        if self.eval_depth >= MAX_EVAL_DEPTH {
            return Err(RuntimeError::EvaluationTooDeep {
                limit: MAX_EVAL_DEPTH,
            });
        }
        self.eval_depth += 1;
        let result = self.evaluate_expr_kind(expr);
        self.eval_depth -= 1;
        result
    }

    fn evaluate_expr_kind(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),

            Expr::Str(s) => Ok(Value::Str(s.clone())),

            Expr::Bool(b) => Ok(Value::Bool(*b)),

            Expr::Var(name, location) => self.lookup_var(name, *location),

            Expr::Input(location) => self.lookup_input(*location),

            Expr::Builtin(builtin) => Ok(Value::Callable(Callable::Builtin(*builtin))),

            Expr::List(items, _) => {
                let values = self.evaluate_args(items)?;
                Ok(Value::list(values))
            }

            Expr::Group(inner) => self.evaluate_expr(inner),

            Expr::Index {
                target,
                index,
                location,
            } => {
                let container = self.evaluate_expr(target)?;
                let index = self.evaluate_expr(index)?;
                self.index_value(&container, &index, *location)
            }

            Expr::Member {
                target,
                name,
                location,
            } => {
                let receiver = self.evaluate_expr(target)?;
                self.evaluate_member(receiver, name, *location)
            }

            Expr::Call {
                callee,
                args,
                location,
            } => {
                let callee = self.evaluate_expr(callee)?;
                let args = self.evaluate_args(args)?;
                self.call_value(&callee, args, *location)
            }

            Expr::Unary {
                op,
                operand,
                location,
            } => self.evaluate_unary_op(*op, operand, *location),

            Expr::Binary {
                op,
                left,
                right,
                location,
            } => self.evaluate_binary_op(*op, left, right, *location),

            Expr::Assign {
                target,
                value,
                location,
            } => self.evaluate_assignment(target, value, *location),

            Expr::Lambda(def) => Ok(self.make_closure(def)),
        }
    }

    pub(crate) fn evaluate_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate_expr(arg)).collect()
    }

    /// `container[index]` for lists and strings
    pub(crate) fn index_value(
        &self,
        container: &Value,
        index: &Value,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        let i = index
            .as_int()
            .ok_or_else(|| RuntimeError::type_error("int index", index.type_name(), location))?;
        match container {
            Value::List(list) => checked_index(i, list.len(), location).and_then(|at| {
                list.get(at).ok_or(RuntimeError::IndexOutOfBounds {
                    index: i,
                    len: list.len(),
                    location,
                })
            }),
            Value::Str(s) => {
                let len = s.chars().count();
                let at = checked_index(i, len, location)?;
                Ok(s.chars()
                    .nth(at)
                    .map(|c| Value::Str(c.to_string()))
                    .unwrap_or_else(|| Value::Str(String::new())))
            }
            other => Err(RuntimeError::type_error(
                "list or string",
                other.type_name(),
                location,
            )),
        }
    }
}

/// Convert a language index into a position below `len`
pub(crate) fn checked_index(index: i64, len: usize, location: Position) -> Result<usize, RuntimeError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(RuntimeError::IndexOutOfBounds {
            index,
            len,
            location,
        })
}
