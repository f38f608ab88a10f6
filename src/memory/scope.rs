//! Lexical scopes
//!
//! Scopes live in a [`ScopeArena`] owned by one execution context and are
//! referred to by [`ScopeId`] handles.  Each scope maps names to values and
//! links to its parent; lookups walk the parent chain.  Closures keep a
//! handle to the scope they were created in instead of owning it, so a
//! function stored into its own defining scope forms no ownership cycle.
//!
//! Scopes are released in LIFO order when a block or call ends, unless a
//! closure captured them.

use super::value::Value;
use rustc_hash::FxHashMap;

/// Handle to a scope in a [`ScopeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct Scope {
    vars: FxHashMap<String, Value>,
    parent: Option<ScopeId>,
    captured: bool,
}

#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    /// Create an arena holding only the global scope
    pub fn new() -> Self {
        ScopeArena {
            scopes: vec![Scope::default()],
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a new scope under `parent`
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        id
    }

    /// Release `scope` if it is the newest one and nothing captured it
    pub fn release(&mut self, scope: ScopeId) {
        if scope.0 != 0 && scope.0 + 1 == self.scopes.len() && !self.scopes[scope.0].captured {
            self.scopes.pop();
        }
    }

    /// Mark `scope` and its ancestors as referenced by a closure
    pub fn capture(&mut self, scope: ScopeId) {
        let mut current = Some(scope);
        while let Some(id) = current {
            let entry = &mut self.scopes[id.0];
            if entry.captured {
                break;
            }
            entry.captured = true;
            current = entry.parent;
        }
    }

    /// Whether `scope` is a live handle into this arena
    pub fn contains(&self, scope: ScopeId) -> bool {
        scope.0 < self.scopes.len()
    }

    /// Scope in the chain starting at `scope` that binds `name`
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let entry = &self.scopes[id.0];
            if entry.vars.contains_key(name) {
                return Some(id);
            }
            current = entry.parent;
        }
        None
    }

    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Value> {
        self.resolve(scope, name)
            .and_then(|id| self.scopes[id.0].vars.get(name))
    }

    /// Bind `name` in `scope` itself, shadowing any outer binding
    pub fn define(&mut self, scope: ScopeId, name: &str, value: Value) {
        self.scopes[scope.0].vars.insert(name.to_string(), value);
    }

    /// Update the nearest existing binding of `name`, or define it in `scope`
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) {
        let target = self.resolve(scope, name).unwrap_or(scope);
        self.define(target, name, value);
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        arena.define(global, "var_a", Value::Int(1));
        let inner = arena.push(global);
        assert_eq!(arena.lookup(inner, "var_a").and_then(Value::as_int), Some(1));
        assert!(arena.lookup(inner, "var_b").is_none());
    }

    #[test]
    fn test_assign_updates_outer_binding() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        arena.define(global, "var_a", Value::Int(1));
        let inner = arena.push(global);
        arena.assign(inner, "var_a", Value::Int(2));
        arena.assign(inner, "var_b", Value::Int(3));
        assert_eq!(arena.lookup(global, "var_a").and_then(Value::as_int), Some(2));
        assert!(arena.lookup(global, "var_b").is_none());
        assert_eq!(arena.resolve(inner, "var_b"), Some(inner));
    }

    #[test]
    fn test_release_is_lifo_and_respects_capture() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        let a = arena.push(global);
        let b = arena.push(a);
        arena.release(a);
        assert_eq!(arena.len(), 3);
        arena.release(b);
        assert_eq!(arena.len(), 2);

        let c = arena.push(a);
        arena.capture(c);
        arena.release(c);
        assert_eq!(arena.len(), 3);
        assert!(arena.contains(c));
    }
}
