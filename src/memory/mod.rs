//! Memory model for the Xene interpreter
//!
//! This module provides the core runtime abstractions:
//! - [`value`]: Runtime value representation (Int, Bool, Str, List, Callable)
//! - [`scope`]: Arena of lexical scopes addressed by handle
//!
//! # Ownership
//!
//! Scopes are owned by the arena of one execution context and never shared
//! with another.  Lists are shared by handle between the values that alias
//! them.

pub mod scope;
pub mod value;

pub use scope::{ScopeArena, ScopeId};
pub use value::{equals, to_string, Callable, Closure, EnvRef, ListRef, Method, Value};
