//! Assignment and place resolution
//!
//! A place is the storage slot an addressable expression names: a variable
//! binding or an element of a list.  `=`, `++` and `--` resolve their target
//! to a place first, then evaluate the right-hand side (if any), then write.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::expressions::checked_index;
use crate::memory::value::{ListRef, Value};
use crate::parser::ast::Expr;
use crate::parser::token::Position;

/// A resolved storage slot
pub(crate) enum Place {
    Var(String),
    Element { list: ListRef, index: usize },
}

impl Interpreter {
    /// Resolve an addressable expression to its storage slot
    pub(crate) fn resolve_place(&mut self, target: &Expr, location: Position) -> Result<Place, RuntimeError> {
        match target {
            Expr::Var(name, _) => Ok(Place::Var(name.clone())),

            Expr::Index {
                target,
                index,
                location,
            } => {
                let container = self.evaluate_expr(target)?;
                let index = self.evaluate_expr(index)?;
                let i = index.as_int().ok_or_else(|| {
                    RuntimeError::type_error("int index", index.type_name(), *location)
                })?;
                match container {
                    Value::List(list) => {
                        let index = checked_index(i, list.len(), *location)?;
                        Ok(Place::Element { list, index })
                    }
                    Value::Str(_) => Err(RuntimeError::NotAddressable {
                        what: "a string element".to_string(),
                        location: *location,
                    }),
                    other => Err(RuntimeError::type_error(
                        "list",
                        other.type_name(),
                        *location,
                    )),
                }
            }

            other => Err(RuntimeError::NotAddressable {
                what: format!("a {}", other.describe()),
                location,
            }),
        }
    }

    /// Current value of a place; `None` for a variable with no binding
    pub(crate) fn read_place(&self, place: &Place) -> Option<Value> {
        match place {
            Place::Var(name) => self.arena.lookup(self.scope, name).cloned(),
            Place::Element { list, index } => list.get(*index),
        }
    }

    pub(crate) fn write_place(&mut self, place: &Place, value: Value, location: Position) -> Result<(), RuntimeError> {
        match place {
            Place::Var(name) => {
                self.arena.assign(self.scope, name, value);
                Ok(())
            }
            Place::Element { list, index } => {
                if list.set(*index, value) {
                    Ok(())
                } else {
                    Err(RuntimeError::IndexOutOfBounds {
                        index: *index as i64,
                        len: list.len(),
                        location,
                    })
                }
            }
        }
    }

    /// `target = value`; evaluates to the written value
    pub(crate) fn evaluate_assignment(
        &mut self,
        target: &Expr,
        value: &Expr,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target, location)?;
        let value = self.evaluate_expr(value)?;
        self.write_place(&place, value.clone(), location)?;
        Ok(value)
    }
}
