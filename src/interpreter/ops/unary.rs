//! Unary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::*;
use crate::parser::token::Position;

impl Interpreter {
    pub(crate) fn evaluate_unary_op(
        &mut self,
        op: UnOp,
        operand: &Expr,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        use UnOp::*;

        match op {
            Neg => self.evaluate_neg_op(operand, location),
            Not => self.evaluate_not_op(operand, location),
            PostInc | PostDec => self.evaluate_inc_dec_op(op, operand, location),
        }
    }

    fn evaluate_neg_op(&mut self, operand: &Expr, location: Position) -> Result<Value, RuntimeError> {
        let val = self.evaluate_expr(operand)?;
        match val {
            Value::Int(n) => n
                .checked_neg()
                .ok_or(RuntimeError::IntegerOverflow {
                    operation: format!("-({})", n),
                    location,
                })
                .map(Value::Int),
            _ => Err(RuntimeError::type_error("int", val.type_name(), location)),
        }
    }

    fn evaluate_not_op(&mut self, operand: &Expr, location: Position) -> Result<Value, RuntimeError> {
        let val = self.evaluate_expr(operand)?;
        match val {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            _ => Err(RuntimeError::type_error("bool", val.type_name(), location)),
        }
    }

    /// Postfix `++`/`--`: commit the new value, yield the old one.
    ///
    /// A variable with no binding counts as holding 0.
    fn evaluate_inc_dec_op(
        &mut self,
        op: UnOp,
        operand: &Expr,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(operand, location)?;
        let current = self.read_place(&place).unwrap_or(Value::Int(0));
        let n = match current {
            Value::Int(n) => n,
            other => return Err(RuntimeError::type_error("int", other.type_name(), location)),
        };

        let updated = match op {
            UnOp::PostInc => n.checked_add(1),
            UnOp::PostDec => n.checked_sub(1),
            _ => unreachable!(),
        }
        .ok_or(RuntimeError::IntegerOverflow {
            operation: format!("{}{}", n, op.symbol()),
            location,
        })?;

        self.write_place(&place, Value::Int(updated), location)?;
        Ok(Value::Int(n))
    }
}
