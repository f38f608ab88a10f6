//! Built-in function implementations
//!
//! This module implements the functions reachable through `fn_name`
//! primaries, and the members of lists and strings.
//!
//! # Supported Built-ins
//!
//! - `abs(n)`, `min(a, b)`, `max(a, b)`: integer helpers
//! - `len(x)`: length of a list or string
//! - `new_list(n)`: list of `n` zeros
//! - `str(x)`: unquoted rendering of any value
//! - `range(n)`: list `[0, 1, ..., n - 1]`
//!
//! # Members
//!
//! - `.length` on lists and strings
//! - `.map(f)`, `.filter(f)`, `.push(v)`, `.sum()`, `.reverse()` on lists;
//!   `push` mutates the receiver and yields it, the others build new lists

use crate::interpreter::constants::MAX_LIST_LEN;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{Callable, ListRef, Method, Value};
use crate::parser::ast::Builtin;
use crate::parser::token::Position;

impl Interpreter {
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        check_arity(builtin.name(), builtin.arity(), args.len(), location)?;

        match builtin {
            Builtin::Abs => {
                let n = expect_int(&args[0], location)?;
                n.checked_abs()
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow {
                        operation: format!("abs({})", n),
                        location,
                    })
            }
            Builtin::Min | Builtin::Max => {
                let a = expect_int(&args[0], location)?;
                let b = expect_int(&args[1], location)?;
                Ok(Value::Int(if builtin == Builtin::Min {
                    a.min(b)
                } else {
                    a.max(b)
                }))
            }
            Builtin::Len => length_of(&args[0], location),
            Builtin::NewList => {
                let n = list_size(&args[0], location)?;
                Ok(Value::list(vec![Value::Int(0); n]))
            }
            Builtin::Str => self.render_value(&args[0], false, location).map(Value::Str),
            Builtin::Range => {
                let n = list_size(&args[0], location)?;
                Ok(Value::list((0..n as i64).map(Value::Int).collect()))
            }
        }
    }

    /// `receiver.name`
    pub(crate) fn evaluate_member(
        &mut self,
        receiver: Value,
        name: &str,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        if name == "length" {
            return length_of(&receiver, location);
        }
        match (receiver, Method::from_name(name)) {
            (Value::List(list), Some(method)) => Ok(Value::Callable(Callable::Method {
                receiver: list,
                method,
            })),
            (other, _) => Err(RuntimeError::UnknownMember {
                name: name.to_string(),
                type_name: other.type_name().to_string(),
                location,
            }),
        }
    }

    pub(crate) fn call_method(
        &mut self,
        receiver: &ListRef,
        method: Method,
        mut args: Vec<Value>,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        check_arity(&format!("list.{}", method.name()), method.arity(), args.len(), location)?;

        match method {
            Method::Map => {
                let f = args.remove(0);
                let mut mapped = Vec::with_capacity(receiver.len());
                for item in receiver.snapshot() {
                    mapped.push(self.call_value(&f, vec![item], location)?);
                }
                Ok(Value::list(mapped))
            }
            Method::Filter => {
                let f = args.remove(0);
                let mut kept = Vec::new();
                for item in receiver.snapshot() {
                    let verdict = self.call_value(&f, vec![item.clone()], location)?;
                    match verdict {
                        Value::Bool(true) => kept.push(item),
                        Value::Bool(false) => {}
                        other => {
                            return Err(RuntimeError::type_error(
                                "bool from filter function",
                                other.type_name(),
                                location,
                            ))
                        }
                    }
                }
                Ok(Value::list(kept))
            }
            Method::Push => {
                if receiver.len() >= MAX_LIST_LEN {
                    return Err(RuntimeError::ListTooLarge {
                        requested: receiver.len() as i64 + 1,
                        limit: MAX_LIST_LEN,
                        location,
                    });
                }
                receiver.push(args.remove(0));
                Ok(Value::List(receiver.clone()))
            }
            Method::Sum => {
                let mut total: i64 = 0;
                for item in receiver.snapshot() {
                    let n = expect_int(&item, location)?;
                    total = total.checked_add(n).ok_or(RuntimeError::IntegerOverflow {
                        operation: format!("{} + {}", total, n),
                        location,
                    })?;
                }
                Ok(Value::Int(total))
            }
            Method::Reverse => {
                let mut items = receiver.snapshot();
                items.reverse();
                Ok(Value::list(items))
            }
        }
    }
}

fn check_arity(function: &str, expected: usize, got: usize, location: Position) -> Result<(), RuntimeError> {
    if expected == got {
        Ok(())
    } else {
        Err(RuntimeError::ArgumentCountMismatch {
            function: function.to_string(),
            expected,
            got,
            location,
        })
    }
}

fn expect_int(value: &Value, location: Position) -> Result<i64, RuntimeError> {
    value
        .as_int()
        .ok_or_else(|| RuntimeError::type_error("int", value.type_name(), location))
}

fn length_of(value: &Value, location: Position) -> Result<Value, RuntimeError> {
    match value {
        Value::List(list) => Ok(Value::Int(list.len() as i64)),
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(RuntimeError::type_error(
            "list or string",
            other.type_name(),
            location,
        )),
    }
}

/// Validate a requested list size
fn list_size(value: &Value, location: Position) -> Result<usize, RuntimeError> {
    let n = expect_int(value, location)?;
    if n < 0 {
        return Err(RuntimeError::type_error(
            "non-negative int",
            &n.to_string(),
            location,
        ));
    }
    if n as u64 > MAX_LIST_LEN as u64 {
        return Err(RuntimeError::ListTooLarge {
            requested: n,
            limit: MAX_LIST_LEN,
            location,
        });
    }
    Ok(n as usize)
}
