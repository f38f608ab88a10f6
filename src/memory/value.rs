//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the closed set of runtime values
//! of the language, together with [`equals`] and [`to_string`].
//!
//! # Value Kinds
//!
//! - [`Value::Int`]: 64-bit signed integer
//! - [`Value::Bool`]: boolean
//! - [`Value::Str`]: immutable string
//! - [`Value::List`]: shared, mutable sequence ([`ListRef`])
//! - [`Value::Callable`]: closure, built-in, or bound list method
//!
//! # Sharing
//!
//! Lists and closures are reference-like: cloning a `Value::List` clones the
//! handle, so a mutation through one alias is visible through every other.

use super::scope::ScopeId;
use crate::parser::ast::{Builtin, FunctionDef};
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Runtime values in the interpreter
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    List(ListRef),
    Callable(Callable),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListRef::new(items))
    }

    /// Kind name used in type errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Callable(_) => "function",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self, false))
    }
}

/// Shared handle to a mutable list
#[derive(Clone, Default)]
pub struct ListRef(Arc<Mutex<Vec<Value>>>);

impl ListRef {
    pub fn new(items: Vec<Value>) -> Self {
        ListRef(Arc::new(Mutex::new(items)))
    }

    // A panicking evaluation leaves the list as it was at the panic.
    fn lock(&self) -> MutexGuard<'_, Vec<Value>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.lock().get(index).cloned()
    }

    /// Overwrite an element; returns `false` when `index` is out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.lock().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.lock().push(value);
    }

    /// Copy of the current elements. Readers take snapshots rather than
    /// holding the lock, so nested lists never lock twice.
    pub fn snapshot(&self) -> Vec<Value> {
        self.lock().clone()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

// Nested lists are released from a worklist, so dropping a deeply nested
// list does not recurse once per level.
impl Drop for ListRef {
    fn drop(&mut self) {
        if Arc::strong_count(&self.0) != 1 {
            return;
        }
        let mut pending = std::mem::take(&mut *self.lock());
        while let Some(value) = pending.pop() {
            if let Value::List(inner) = value {
                if Arc::strong_count(&inner.0) == 1 {
                    pending.append(&mut *inner.lock());
                }
            }
        }
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListRef({:#x}, len {})", self.id(), self.len())
    }
}

/// Handle to the scope a closure captured, qualified by its owning context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvRef {
    pub context: u64,
    pub scope: ScopeId,
}

/// A user-defined function value
#[derive(Debug, Clone)]
pub struct Closure {
    pub def: Arc<FunctionDef>,
    /// `None` for programs, which run in a context's global scope
    pub env: Option<EnvRef>,
}

impl Closure {
    pub fn new(def: Arc<FunctionDef>, env: Option<EnvRef>) -> Self {
        Self { def, env }
    }
}

/// List methods reachable through `.name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Map,
    Filter,
    Push,
    Sum,
    Reverse,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Method> {
        match name {
            "map" => Some(Method::Map),
            "filter" => Some(Method::Filter),
            "push" => Some(Method::Push),
            "sum" => Some(Method::Sum),
            "reverse" => Some(Method::Reverse),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Map => "map",
            Method::Filter => "filter",
            Method::Push => "push",
            Method::Sum => "sum",
            Method::Reverse => "reverse",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Method::Map | Method::Filter | Method::Push => 1,
            Method::Sum | Method::Reverse => 0,
        }
    }
}

/// Invocable values
#[derive(Debug, Clone)]
pub enum Callable {
    Closure(Closure),
    Builtin(Builtin),
    /// A list method bound to its receiver
    Method { receiver: ListRef, method: Method },
}

impl Callable {
    /// Display name used in arity errors
    pub fn name(&self) -> String {
        match self {
            Callable::Closure(_) => "function".to_string(),
            Callable::Builtin(b) => b.name().to_string(),
            Callable::Method { method, .. } => format!("list.{}", method.name()),
        }
    }

    /// Identity comparison: the same closure, built-in, or bound method
    pub fn same(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Closure(a), Callable::Closure(b)) => {
                Arc::ptr_eq(&a.def, &b.def) && a.env == b.env
            }
            (Callable::Builtin(a), Callable::Builtin(b)) => a == b,
            (
                Callable::Method {
                    receiver: ra,
                    method: ma,
                },
                Callable::Method {
                    receiver: rb,
                    method: mb,
                },
            ) => ma == mb && ra.ptr_eq(rb),
            _ => false,
        }
    }
}

// ===== Equality =====

/// Kind-aware equality. Values of different kinds are never equal.
pub fn equals(a: &Value, b: &Value) -> bool {
    match equals_with(a, b, &mut |_| Ok::<(), Infallible>(())) {
        Ok(result) => result,
        Err(never) => match never {},
    }
}

/// [`equals`], calling `visit` with the current list nesting before each
/// element comparison; an error from `visit` stops the walk.
pub fn equals_with<E>(
    a: &Value,
    b: &Value,
    visit: &mut impl FnMut(usize) -> Result<(), E>,
) -> Result<bool, E> {
    equals_inner(a, b, &mut Vec::new(), visit)
}

// `visiting` holds list pairs already under comparison; meeting one again
// means both sides cycle the same way.
fn equals_inner<E>(
    a: &Value,
    b: &Value,
    visiting: &mut Vec<(usize, usize)>,
    visit: &mut impl FnMut(usize) -> Result<(), E>,
) -> Result<bool, E> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::List(x), Value::List(y)) => {
            if x.ptr_eq(y) {
                return Ok(true);
            }
            let pair = (x.id(), y.id());
            if visiting.contains(&pair) {
                return Ok(true);
            }
            let (xs, ys) = (x.snapshot(), y.snapshot());
            if xs.len() != ys.len() {
                return Ok(false);
            }
            visiting.push(pair);
            let mut result = Ok(true);
            for (l, r) in xs.iter().zip(&ys) {
                if let Err(e) = visit(visiting.len()) {
                    result = Err(e);
                    break;
                }
                match equals_inner(l, r, visiting, visit) {
                    Ok(true) => {}
                    other => {
                        result = other;
                        break;
                    }
                }
            }
            visiting.pop();
            result
        }
        (Value::Callable(x), Value::Callable(y)) => Ok(x.same(y)),
        _ => Ok(false),
    }
}

// ===== Rendering =====

/// Longest rendering produced by [`to_string`] before it is cut short
pub const RENDER_LIMIT: usize = 1_000_000;

/// Lists nested deeper than this render as `[...]`
pub const MAX_VALUE_DEPTH: usize = 1_000;

/// Render a value. `quoted` wraps a top-level string in quotes; strings
/// nested in lists are always quoted.
///
/// Output longer than [`RENDER_LIMIT`] is truncated and ends in `...`.
pub fn to_string(value: &Value, quoted: bool) -> String {
    let mut out = String::new();
    let truncated = render_with(value, quoted, &mut out, &mut |len| {
        if len > RENDER_LIMIT {
            Err(())
        } else {
            Ok(())
        }
    });
    if truncated.is_err() {
        out.push_str("...");
    }
    out
}

/// Render into `out`, calling `visit` with the output length after every
/// value written; an error from `visit` stops the walk.
pub fn render_with<E>(
    value: &Value,
    quoted: bool,
    out: &mut String,
    visit: &mut impl FnMut(usize) -> Result<(), E>,
) -> Result<(), E> {
    render(value, quoted, &mut Vec::new(), out, visit)
}

fn render<E>(
    value: &Value,
    quoted: bool,
    open: &mut Vec<usize>,
    out: &mut String,
    visit: &mut impl FnMut(usize) -> Result<(), E>,
) -> Result<(), E> {
    match value {
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Str(s) if quoted => out.push_str(&quote(s)),
        Value::Str(s) => out.push_str(s),
        Value::Callable(_) => out.push_str("<function>"),
        Value::List(list) => {
            if open.len() >= MAX_VALUE_DEPTH || open.contains(&list.id()) {
                out.push_str("[...]");
                return visit(out.len());
            }
            open.push(list.id());
            out.push('[');
            for (i, item) in list.snapshot().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render(item, true, open, out, visit)?;
            }
            out.push(']');
            open.pop();
        }
    }
    visit(out.len())
}

/// Quote a string, escaping the characters the lexer accepts as escapes
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
