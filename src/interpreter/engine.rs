// Evaluation engine for the Xene interpreter

use crate::interpreter::constants::{INPUT_NAME, MAX_CALL_DEPTH, MAX_STRING_LEN};
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::{ScopeArena, ScopeId};
use crate::memory::value::{
    equals_with, render_with, Callable, Closure, EnvRef, Value, MAX_VALUE_DEPTH,
};
use crate::parser::ast::*;
use crate::parser::token::Position;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Non-local control flow raised by a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Normal,
    Return,
}

/// Tree-walking evaluator for one call.
///
/// Owns the context's scope arena for the duration of the call and hands it
/// back through [`Interpreter::into_arena`].  Statements, loop iterations and
/// calls are suspension points: each one checks the deadline and the cancel
/// flag before doing any work.
pub struct Interpreter {
    /// Id of the context the arena belongs to
    context_id: u64,

    /// Scopes of the owning context
    pub(crate) arena: ScopeArena,

    /// Scope that assignments and lookups start from
    pub(crate) scope: ScopeId,

    deadline: Instant,
    timeout: Duration,
    cancel: Arc<AtomicBool>,

    /// Current nesting of closure calls
    depth: usize,

    /// Current nesting of expression evaluation, across calls
    pub(crate) eval_depth: usize,

    pub(crate) control_flow: ControlFlow,

    /// Value carried by a pending `return`
    pub(crate) return_value: Option<Value>,
}

impl Interpreter {
    pub fn new(
        context_id: u64,
        arena: ScopeArena,
        timeout: Duration,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let scope = arena.global();
        Interpreter {
            context_id,
            arena,
            scope,
            deadline: Instant::now() + timeout,
            timeout,
            cancel,
            depth: 0,
            eval_depth: 0,
            control_flow: ControlFlow::Normal,
            return_value: None,
        }
    }

    pub fn into_arena(self) -> ScopeArena {
        self.arena
    }

    /// Suspension point: fail once the deadline passed or the caller gave up
    pub(crate) fn checkpoint(&self) -> Result<(), RuntimeError> {
        if self.cancel.load(Ordering::Relaxed) || Instant::now() >= self.deadline {
            return Err(RuntimeError::Timeout {
                limit: self.timeout,
            });
        }
        Ok(())
    }

    /// Render `value`, checking the deadline at every element
    pub(crate) fn render_value(
        &self,
        value: &Value,
        quoted: bool,
        location: Position,
    ) -> Result<String, RuntimeError> {
        let mut out = String::new();
        render_with(value, quoted, &mut out, &mut |len| {
            if len > MAX_STRING_LEN {
                return Err(RuntimeError::StringTooLarge {
                    limit: MAX_STRING_LEN,
                    location,
                });
            }
            self.checkpoint()
        })?;
        Ok(out)
    }

    /// Deep equality, checking the deadline at every list element
    pub(crate) fn values_equal(&self, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        equals_with(a, b, &mut |depth| {
            if depth > MAX_VALUE_DEPTH {
                return Err(RuntimeError::EvaluationTooDeep {
                    limit: MAX_VALUE_DEPTH,
                });
            }
            self.checkpoint()
        })
    }

    // ===== Variables =====

    pub(crate) fn lookup_var(&self, name: &str, location: Position) -> Result<Value, RuntimeError> {
        match self.arena.lookup(self.scope, name) {
            Some(value) => Ok(value.clone()),
            None if name.starts_with("fn_") => Err(RuntimeError::UnknownFunction {
                name: name.to_string(),
                location,
            }),
            None => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                location,
            }),
        }
    }

    pub(crate) fn lookup_input(&self, location: Position) -> Result<Value, RuntimeError> {
        self.lookup_var(INPUT_NAME, location)
    }

    /// Closure over the current scope
    pub(crate) fn make_closure(&mut self, def: &Arc<FunctionDef>) -> Value {
        self.arena.capture(self.scope);
        Value::Callable(Callable::Closure(Closure::new(
            Arc::clone(def),
            Some(EnvRef {
                context: self.context_id,
                scope: self.scope,
            }),
        )))
    }

    // ===== Calls =====

    /// Call any value; only callables succeed
    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Callable(callable) => self.call_callable(callable, args, location),
            other => Err(RuntimeError::NotCallable {
                got: other.type_name().to_string(),
                location,
            }),
        }
    }

    pub fn call_callable(
        &mut self,
        callable: &Callable,
        args: Vec<Value>,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        self.checkpoint()?;
        match callable {
            Callable::Closure(closure) => self.call_closure(closure, args, location),
            Callable::Builtin(builtin) => self.call_builtin(*builtin, args, location),
            Callable::Method { receiver, method } => {
                self.call_method(receiver, *method, args, location)
            }
        }
    }

    fn call_closure(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
        location: Position,
    ) -> Result<Value, RuntimeError> {
        let def = &closure.def;
        if args.len() != def.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: "function".to_string(),
                expected: def.params.len(),
                got: args.len(),
                location,
            });
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
                location,
            });
        }

        // Programs run in the global scope itself; closures get a fresh
        // scope under the one they captured.
        let scope = match closure.env {
            None => self.arena.global(),
            Some(env) if env.context == self.context_id && self.arena.contains(env.scope) => {
                self.arena.push(env.scope)
            }
            Some(_) => return Err(RuntimeError::ForeignClosure { location }),
        };

        for (param, arg) in def.params.iter().zip(args) {
            self.arena.define(scope, param, arg);
        }

        let saved_scope = std::mem::replace(&mut self.scope, scope);
        self.depth += 1;
        let result = self.execute_body(def);
        self.depth -= 1;
        self.scope = saved_scope;
        self.arena.release(scope);
        result
    }

    fn execute_body(&mut self, def: &FunctionDef) -> Result<Value, RuntimeError> {
        match &def.body {
            Body::Expr(expr) => self.evaluate_expr(expr),
            Body::Block(stmts) => {
                let value = self.execute_block(stmts)?;
                if self.control_flow == ControlFlow::Return {
                    self.control_flow = ControlFlow::Normal;
                    if let Some(returned) = self.return_value.take() {
                        return Ok(returned);
                    }
                }
                value.ok_or(RuntimeError::NoValue {
                    location: def.location,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_function;

    fn interpreter(timeout: Duration) -> Interpreter {
        Interpreter::new(7, ScopeArena::new(), timeout, Arc::new(AtomicBool::new(false)))
    }

    fn program(source: &str) -> Callable {
        Callable::Closure(Closure::new(parse_function(source).unwrap(), None))
    }

    #[test]
    fn test_block_value_is_last_produced() {
        let mut interp = interpreter(Duration::from_secs(5));
        let value = interp
            .call_callable(&program("1; 2; while false { }"), vec![], Position::start())
            .unwrap();
        assert_eq!(value.as_int(), Some(2));
    }

    #[test]
    fn test_no_value() {
        let mut interp = interpreter(Duration::from_secs(5));
        let err = interp
            .call_callable(&program("while false { }"), vec![], Position::start())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NoValue { .. }));
    }

    #[test]
    fn test_cancel_flag_stops_evaluation() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut interp = Interpreter::new(1, ScopeArena::new(), Duration::from_secs(5), cancel);
        let err = interp
            .call_callable(&program("1"), vec![], Position::start())
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_foreign_closure() {
        let mut interp = interpreter(Duration::from_secs(5));
        let def = parse_function("1").unwrap();
        let foreign = Callable::Closure(Closure::new(
            def,
            Some(EnvRef {
                context: 99,
                scope: ScopeArena::new().global(),
            }),
        ));
        let err = interp
            .call_callable(&foreign, vec![], Position::start())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ForeignClosure { .. }));
    }

    #[test]
    fn test_recursion_depth_is_bounded() {
        let mut interp = interpreter(Duration::from_secs(30));
        let source = "fn_f = function var_n -> fn_f(var_n + 1); fn_f(0)";
        let err = std::thread::Builder::new()
            .stack_size(crate::interpreter::constants::WORKER_STACK_SIZE)
            .spawn(move || {
                interp
                    .call_callable(&program(source), vec![], Position::start())
                    .unwrap_err()
            })
            .unwrap()
            .join()
            .unwrap();
        assert!(matches!(err, RuntimeError::CallDepthExceeded { .. }), "{}", err);
    }
}
