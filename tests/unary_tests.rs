// Unary operator behavior: negation, logical not, and post-increment/decrement

use std::time::{Duration, Instant};
use xene::interpreter::constants::DEFAULT_TIMEOUT;
use xene::memory::value::{equals, Value};
use xene::{exec, Error};

fn check_values(cases: &[(&str, Value)]) {
    for (code, expected) in cases {
        match exec(code, DEFAULT_TIMEOUT) {
            Ok(value) => assert!(
                equals(&value, expected),
                "Failed got {} expected {}\nCode: {}",
                value,
                expected,
                code
            ),
            Err(e) => panic!("{}\nCode: {}", e, code),
        }
    }
}

fn check_failures(cases: &[&str]) {
    for code in cases {
        if let Ok(value) = exec(code, DEFAULT_TIMEOUT) {
            panic!("Failed to fail!\nResult: {}\nCode: {}", value, code);
        }
    }
}

#[test]
fn test_negative_int() {
    check_values(&[
        ("var_a = -3", Value::Int(-3)),
        ("var_a = 3; return -var_a", Value::Int(-3)),
        ("var_a = [3]; return -var_a[0]", Value::Int(-3)),
        ("5*-3", Value::Int(-15)),
        ("-3*5", Value::Int(-15)),
        ("4-7", Value::Int(-3)),
        ("-(-3)", Value::Int(3)),
        ("-[3][0]", Value::Int(-3)),
        ("-abs(-3)", Value::Int(-3)),
        ("(-1)", Value::Int(-1)),
        ("1-(-1)", Value::Int(2)),
        ("1 - -1", Value::Int(2)),
    ]);
}

#[test]
fn test_negative_int_fail() {
    check_failures(&["-[1]", "1---1", "-true", "1--1"]);
}

#[test]
fn test_negative_bool() {
    check_values(&[
        ("!true", Value::Bool(false)),
        ("var_a = true; return !var_a", Value::Bool(false)),
        ("var_a = [true]; return !var_a[0]", Value::Bool(false)),
        ("true == !false", Value::Bool(true)),
        ("!(1 < 2)", Value::Bool(false)),
        ("!(!true)", Value::Bool(true)),
    ]);
}

#[test]
fn test_negative_bool_fail() {
    check_failures(&["![true]", "!!true", "!3 < 4"]);
}

#[test]
fn test_double_bang_is_a_parse_error() {
    let err = exec("!!true", DEFAULT_TIMEOUT).unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "{}", err);
}

#[test]
fn test_increments() {
    check_values(&[
        ("var_a = 2; var_a++", Value::Int(2)),
        ("var_a = 2; var_a++;var_a", Value::Int(3)),
        ("var_a = [1]; var_a[0]++; var_a[0]", Value::Int(2)),
        ("var_a = [1]; var_a[0]--; var_a[0]", Value::Int(0)),
        ("var_a--", Value::Int(0)),
        ("var_a--;var_a", Value::Int(-1)),
        (
            "new_list(1).map(function var_a -> var_a++)[0]",
            Value::Int(0),
        ),
        ("var_a = 3; var_a-- + 3", Value::Int(6)),
        ("var_a---1", Value::Int(-1)),
        ("var_a---1;var_a", Value::Int(-1)),
        ("var_a = 5; var_a---1", Value::Int(4)),
        ("var_a = 5; var_a---1; var_a", Value::Int(4)),
    ]);
}

#[test]
fn test_increments_fail() {
    check_failures(&["[1]++", "[1].length--", "(var_a)++", "\"ab\"[0]++"]);
}

#[test]
fn test_unbounded_loop_times_out() {
    let limit = Duration::from_millis(100);
    let started = Instant::now();
    let err = exec("while true { }", limit).unwrap_err();
    match err {
        Error::Runtime(e) => assert!(e.is_timeout(), "{}", e),
        other => panic!("expected a timeout, got {}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_loop_inside_call_times_out() {
    let err = exec(
        "fn_spin = function -> { while true { } }; fn_spin()",
        Duration::from_millis(100),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Runtime(ref e) if e.is_timeout()), "{}", err);
}
