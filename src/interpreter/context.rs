//! Execution contexts
//!
//! A [`Context`] owns a scope arena and a timeout.  [`Context::call`] runs a
//! callable on a dedicated worker thread and waits for it at most the
//! timeout.  The worker checks the same deadline cooperatively at every
//! statement, loop iteration and call; if the caller stops waiting first it
//! raises the cancel flag and abandons the worker, whose late result is
//! dropped with the channel.
//!
//! An abandoned worker may still hold the old scope arena, so a timed-out
//! context starts over with fresh scopes under a new id; closures created
//! before the timeout no longer resolve.

use crate::interpreter::constants::{DEFAULT_TIMEOUT, INPUT_NAME, WORKER_STACK_SIZE};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::ScopeArena;
use crate::memory::value::Value;
use crate::parser::token::Position;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_context_id() -> u64 {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Per-call scope plus deadline
#[derive(Debug)]
pub struct Context {
    id: u64,
    arena: ScopeArena,
    timeout: Duration,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Context {
    pub fn new(timeout: Duration) -> Self {
        Context {
            id: next_context_id(),
            arena: ScopeArena::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bind a global variable
    pub fn set(&mut self, name: &str, value: Value) {
        let global = self.arena.global();
        self.arena.define(global, name, value);
    }

    /// Bind the test-case input
    pub fn set_input(&mut self, value: Value) {
        self.set(INPUT_NAME, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.arena.lookup(self.arena.global(), name).cloned()
    }

    /// Call `callee` with `args`, waiting at most the context's timeout.
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        self.run(callee, args, |_, value| Ok(value))
    }

    /// Like [`Context::call`], but also render the result on the worker, so
    /// the rendering counts against the same timeout.
    pub fn call_rendered(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        quoted: bool,
    ) -> Result<String, RuntimeError> {
        self.run(callee, args, move |interp, value| {
            interp.render_value(&value, quoted, Position::start())
        })
    }

    fn run<T, F>(&mut self, callee: &Value, args: Vec<Value>, finish: F) -> Result<T, RuntimeError>
    where
        T: Send + 'static,
        F: FnOnce(&Interpreter, Value) -> Result<T, RuntimeError> + Send + 'static,
    {
        let Value::Callable(callable) = callee else {
            return Err(RuntimeError::NotCallable {
                got: callee.type_name().to_string(),
                location: Position::start(),
            });
        };

        let callable = callable.clone();
        let arena = std::mem::take(&mut self.arena);
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        let worker = {
            let cancel = Arc::clone(&cancel);
            let (id, timeout) = (self.id, self.timeout);
            thread::Builder::new()
                .name(format!("xene-eval-{}", id))
                .stack_size(WORKER_STACK_SIZE)
                .spawn(move || {
                    let mut interp = Interpreter::new(id, arena, timeout, cancel);
                    let result = interp
                        .call_callable(&callable, args, Position::start())
                        .and_then(|value| finish(&interp, value));
                    // The caller may have given up already.
                    let _ = tx.send((result, interp.into_arena()));
                })
        };
        if let Err(e) = worker {
            self.reset();
            return Err(RuntimeError::WorkerFailed {
                message: e.to_string(),
            });
        }

        match rx.recv_timeout(self.timeout) {
            Ok((result, arena)) => {
                self.arena = arena;
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                self.reset();
                Err(RuntimeError::Timeout {
                    limit: self.timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.reset();
                Err(RuntimeError::WorkerFailed {
                    message: "evaluation worker panicked".to_string(),
                })
            }
        }
    }

    fn reset(&mut self) {
        self.id = next_context_id();
        self.arena = ScopeArena::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::time::Instant;

    #[test]
    fn test_call_binds_input() {
        let program = parse("input * 2").unwrap();
        let mut ctx = Context::default();
        ctx.set_input(Value::Int(21));
        assert_eq!(ctx.call(&program, vec![]).unwrap().as_int(), Some(42));
    }

    #[test]
    fn test_globals_persist_between_calls() {
        let mut ctx = Context::default();
        ctx.call(&parse("var_a = 5").unwrap(), vec![]).unwrap();
        assert_eq!(ctx.get("var_a").and_then(|v| v.as_int()), Some(5));
        let value = ctx.call(&parse("var_a++; var_a").unwrap(), vec![]).unwrap();
        assert_eq!(value.as_int(), Some(6));
    }

    #[test]
    fn test_closure_runs_in_its_context() {
        let mut ctx = Context::default();
        let f = ctx
            .call(&parse("var_k = 10; function var_x -> var_x + var_k").unwrap(), vec![])
            .unwrap();
        assert!(f.is_callable());
        assert_eq!(ctx.call(&f, vec![Value::Int(1)]).unwrap().as_int(), Some(11));

        let mut other = Context::default();
        let err = other.call(&f, vec![Value::Int(1)]).unwrap_err();
        assert!(matches!(err, RuntimeError::ForeignClosure { .. }));
    }

    #[test]
    fn test_timeout_is_bounded() {
        let mut ctx = Context::new(Duration::from_millis(50));
        let started = Instant::now();
        let err = ctx.call(&parse("while true { }").unwrap(), vec![]).unwrap_err();
        assert!(err.is_timeout(), "{}", err);
        assert!(started.elapsed() < Duration::from_secs(2));

        // The context stays usable afterwards.
        let value = ctx.call(&parse("1 + 1").unwrap(), vec![]).unwrap();
        assert_eq!(value.as_int(), Some(2));
    }

    #[test]
    fn test_rendering_counts_against_the_timeout() {
        let program =
            parse("var_l = [1]; foreach var_i in range(40) { var_l = [var_l, var_l] } var_l").unwrap();
        let mut ctx = Context::new(Duration::from_millis(100));
        let started = Instant::now();
        let err = ctx.call_rendered(&program, vec![], true).unwrap_err();
        assert!(
            err.is_timeout() || matches!(err, RuntimeError::StringTooLarge { .. }),
            "{}",
            err
        );
        assert!(started.elapsed() < Duration::from_secs(2));

        let text = ctx.call_rendered(&parse("[\"a\", 1]").unwrap(), vec![], true).unwrap();
        assert_eq!(text, "[\"a\", 1]");
    }

    #[test]
    fn test_not_callable() {
        let mut ctx = Context::default();
        let err = ctx.call(&Value::Int(1), vec![]).unwrap_err();
        assert!(matches!(err, RuntimeError::NotCallable { .. }));
    }
}
