//! Runtime error types for the Xene interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! while evaluating a callable (as opposed to parse errors).
//!
//! A runtime error aborts only the call that raised it; the context that ran
//! the call stays usable.

use crate::parser::token::Position;
use std::fmt;
use std::time::Duration;

/// Runtime errors that can occur during evaluation
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// Read of a variable with no binding in the scope chain
    UndefinedVariable { name: String, location: Position },

    /// Call through a function slot that was never assigned
    UnknownFunction { name: String, location: Position },

    /// `.name` that the receiver does not have
    UnknownMember {
        name: String,
        type_name: String,
        location: Position,
    },

    /// Call of a value that is not callable
    NotCallable { got: String, location: Position },

    /// Operand of the wrong kind
    TypeError {
        expected: String,
        got: String,
        location: Position,
    },

    /// Write through an expression with no backing storage
    NotAddressable { what: String, location: Position },

    /// List or string index out of range
    IndexOutOfBounds {
        index: i64,
        len: usize,
        location: Position,
    },

    /// Integer overflow in arithmetic operation
    IntegerOverflow { operation: String, location: Position },

    /// Division or modulo by zero
    DivisionByZero { operation: String, location: Position },

    /// Function argument count mismatch
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        location: Position,
    },

    /// Nested calls exceeded the recursion limit
    CallDepthExceeded { limit: usize, location: Position },

    /// Expression evaluation nested deeper than the limit
    EvaluationTooDeep { limit: usize },

    /// A list would exceed the element limit
    ListTooLarge {
        requested: i64,
        limit: usize,
        location: Position,
    },

    /// A string, or the rendering of a value, would exceed the length limit
    StringTooLarge { limit: usize, location: Position },

    /// A callable finished without producing a value
    NoValue { location: Position },

    /// A closure was called outside the context that created it
    ForeignClosure { location: Position },

    /// The call did not finish within the context's timeout
    Timeout { limit: Duration },

    /// The evaluation worker could not be started or died
    WorkerFailed { message: String },
}

impl RuntimeError {
    pub fn location(&self) -> Option<&Position> {
        match self {
            RuntimeError::UndefinedVariable { location, .. } => Some(location),
            RuntimeError::UnknownFunction { location, .. } => Some(location),
            RuntimeError::UnknownMember { location, .. } => Some(location),
            RuntimeError::NotCallable { location, .. } => Some(location),
            RuntimeError::TypeError { location, .. } => Some(location),
            RuntimeError::NotAddressable { location, .. } => Some(location),
            RuntimeError::IndexOutOfBounds { location, .. } => Some(location),
            RuntimeError::IntegerOverflow { location, .. } => Some(location),
            RuntimeError::DivisionByZero { location, .. } => Some(location),
            RuntimeError::ArgumentCountMismatch { location, .. } => Some(location),
            RuntimeError::CallDepthExceeded { location, .. } => Some(location),
            RuntimeError::ListTooLarge { location, .. } => Some(location),
            RuntimeError::StringTooLarge { location, .. } => Some(location),
            RuntimeError::NoValue { location } => Some(location),
            RuntimeError::ForeignClosure { location } => Some(location),
            RuntimeError::EvaluationTooDeep { .. } => None,
            RuntimeError::Timeout { .. } => None,
            RuntimeError::WorkerFailed { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RuntimeError::Timeout { .. })
    }

    pub(crate) fn type_error(expected: &str, got: &str, location: Position) -> Self {
        RuntimeError::TypeError {
            expected: expected.to_string(),
            got: got.to_string(),
            location,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UndefinedVariable { name, location } => {
                write!(f, "Undefined variable '{}' at line {}", name, location.line)
            }
            RuntimeError::UnknownFunction { name, location } => {
                write!(f, "Undefined function '{}' at line {}", name, location.line)
            }
            RuntimeError::UnknownMember {
                name,
                type_name,
                location,
            } => {
                write!(
                    f,
                    "Type {} has no member '{}' at line {}",
                    type_name, name, location.line
                )
            }
            RuntimeError::NotCallable { got, location } => {
                write!(f, "Value of type {} is not callable at line {}", got, location.line)
            }
            RuntimeError::TypeError {
                expected,
                got,
                location,
            } => {
                write!(
                    f,
                    "Type error at line {}: expected {}, got {}",
                    location.line, expected, got
                )
            }
            RuntimeError::NotAddressable { what, location } => {
                write!(f, "Cannot assign to {} at line {}", what, location.line)
            }
            RuntimeError::IndexOutOfBounds {
                index,
                len,
                location,
            } => {
                write!(
                    f,
                    "Index {} out of bounds for length {} at line {}",
                    index, len, location.line
                )
            }
            RuntimeError::IntegerOverflow {
                operation,
                location,
            } => {
                write!(
                    f,
                    "Integer overflow in operation: {} at line {}",
                    operation, location.line
                )
            }
            RuntimeError::DivisionByZero {
                operation,
                location,
            } => {
                write!(f, "Division by zero: {} at line {}", operation, location.line)
            }
            RuntimeError::ArgumentCountMismatch {
                function,
                expected,
                got,
                location,
            } => {
                write!(
                    f,
                    "Function '{}' expects {} argument{}, got {} at line {}",
                    function,
                    expected,
                    if *expected == 1 { "" } else { "s" },
                    got,
                    location.line
                )
            }
            RuntimeError::CallDepthExceeded { limit, location } => {
                write!(
                    f,
                    "Call depth limit of {} exceeded at line {}",
                    limit, location.line
                )
            }
            RuntimeError::EvaluationTooDeep { limit } => {
                write!(f, "Evaluation nested deeper than {} levels", limit)
            }
            RuntimeError::ListTooLarge {
                requested,
                limit,
                location,
            } => {
                write!(
                    f,
                    "List of {} elements exceeds the limit of {} at line {}",
                    requested, limit, location.line
                )
            }
            RuntimeError::StringTooLarge { limit, location } => {
                write!(
                    f,
                    "String exceeds the limit of {} characters at line {}",
                    limit, location.line
                )
            }
            RuntimeError::NoValue { location } => {
                write!(
                    f,
                    "Function defined at line {} produced no value",
                    location.line
                )
            }
            RuntimeError::ForeignClosure { location } => {
                write!(
                    f,
                    "Function called at line {} belongs to another execution context",
                    location.line
                )
            }
            RuntimeError::Timeout { limit } => {
                write!(f, "Execution timed out after {} ms", limit.as_millis())
            }
            RuntimeError::WorkerFailed { message } => {
                write!(f, "Evaluation worker failed: {}", message)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let err = RuntimeError::UndefinedVariable {
            name: "var_x".to_string(),
            location: Position::new(10, 3, 1),
        };
        assert_eq!(err.to_string(), "Undefined variable 'var_x' at line 3");
        assert_eq!(err.location().map(|p| p.offset), Some(10));
    }

    #[test]
    fn test_timeout_has_no_location() {
        let err = RuntimeError::Timeout {
            limit: Duration::from_millis(100),
        };
        assert!(err.is_timeout());
        assert!(err.location().is_none());
        assert_eq!(err.to_string(), "Execution timed out after 100 ms");
    }
}
