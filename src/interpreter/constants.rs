// Constants for the Xene interpreter

use std::time::Duration;

/// Timeout for running a program
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeout for evaluating a test case's input expression
pub const INPUT_TIMEOUT: Duration = Duration::from_millis(100);

/// Name the test-case input is bound to
pub const INPUT_NAME: &str = "input";

/// Maximum nesting of user-visible calls
pub const MAX_CALL_DEPTH: usize = 1000;

/// Maximum nesting of expression evaluation, counted across calls
pub const MAX_EVAL_DEPTH: usize = 10_000;

/// Maximum number of elements a single list may hold
pub const MAX_LIST_LEN: usize = 1_000_000;

/// Maximum length of a string, including the rendering of a value
pub const MAX_STRING_LEN: usize = 1_000_000;

/// Stack reserved for each evaluation worker thread
pub const WORKER_STACK_SIZE: usize = 128 * 1024 * 1024;
