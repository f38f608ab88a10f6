//! Binary operator evaluation
//!
//! Arithmetic is checked `i64` arithmetic; overflow and division by zero are
//! runtime errors.  `+` also concatenates two strings or two lists.  `&&` and
//! `||` short-circuit.

use crate::interpreter::constants::{MAX_LIST_LEN, MAX_STRING_LEN};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{BinOp, Expr};
use crate::parser::token::Position;
use std::cmp::Ordering;

impl Interpreter {
    pub(crate) fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        if let BinOp::And | BinOp::Or = op {
            return self.evaluate_logical_op(op, left, right, location);
        }

        let left_val = self.evaluate_expr(left)?;
        let right_val = self.evaluate_expr(right)?;
        self.apply_binary_op(op, &left_val, &right_val, location)
    }

    fn evaluate_logical_op(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        let lhs = self.expect_bool(left, location)?;
        match (op, lhs) {
            (BinOp::And, false) => Ok(Value::Bool(false)),
            (BinOp::Or, true) => Ok(Value::Bool(true)),
            _ => self.expect_bool(right, location).map(Value::Bool),
        }
    }

    fn expect_bool(&mut self, expr: &Expr, location: Position) -> Result<bool, RuntimeError> {
        let value = self.evaluate_expr(expr)?;
        value
            .as_bool()
            .ok_or_else(|| RuntimeError::type_error("bool", value.type_name(), location))
    }

    pub(crate) fn apply_binary_op(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        use BinOp::*;

        match op {
            Eq => self.values_equal(left, right).map(Value::Bool),
            Ne => self.values_equal(left, right).map(|eq| Value::Bool(!eq)),
            Lt | Le | Gt | Ge => {
                let ordering = compare_values(left, right, location)?;
                Ok(Value::Bool(match op {
                    Lt => ordering == Ordering::Less,
                    Le => ordering != Ordering::Greater,
                    Gt => ordering == Ordering::Greater,
                    Ge => ordering != Ordering::Less,
                    _ => unreachable!(),
                }))
            }
            Add => match (left, right) {
                (Value::Str(a), Value::Str(b)) => {
                    if a.len() + b.len() > MAX_STRING_LEN {
                        return Err(RuntimeError::StringTooLarge {
                            limit: MAX_STRING_LEN,
                            location,
                        });
                    }
                    Ok(Value::Str(format!("{}{}", a, b)))
                }
                (Value::List(a), Value::List(b)) => {
                    let mut items = a.snapshot();
                    items.extend(b.snapshot());
                    if items.len() > MAX_LIST_LEN {
                        return Err(RuntimeError::ListTooLarge {
                            requested: items.len() as i64,
                            limit: MAX_LIST_LEN,
                            location,
                        });
                    }
                    Ok(Value::list(items))
                }
                _ => checked_arith(op, left, right, location),
            },
            Sub | Mul | Div | Mod => checked_arith(op, left, right, location),
            And | Or => unreachable!("logical operators short-circuit"),
        }
    }
}

fn compare_values(left: &Value, right: &Value, location: Position) -> Result<Ordering, RuntimeError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => Err(RuntimeError::type_error(
            "two ints or two strings",
            &format!("{} and {}", left.type_name(), right.type_name()),
            location,
        )),
    }
}

#[inline]
fn checked_arith(op: BinOp, left: &Value, right: &Value, location: Position) -> Result<Value, RuntimeError> {
    let (Value::Int(a), Value::Int(b)) = (left, right) else {
        let expected = if op == BinOp::Add {
            "two ints, strings or lists"
        } else {
            "two ints"
        };
        return Err(RuntimeError::type_error(
            expected,
            &format!("{} and {}", left.type_name(), right.type_name()),
            location,
        ));
    };
    let (a, b) = (*a, *b);
    let operation = || format!("{} {} {}", a, op.symbol(), b);

    if matches!(op, BinOp::Div | BinOp::Mod) && b == 0 {
        return Err(RuntimeError::DivisionByZero {
            operation: operation(),
            location,
        });
    }

    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => a.checked_div(b),
        BinOp::Mod => a.checked_rem(b),
        _ => unreachable!(),
    };
    result.map(Value::Int).ok_or_else(|| RuntimeError::IntegerOverflow {
        operation: operation(),
        location,
    })
}
