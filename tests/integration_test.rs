// Integration tests for the Xene interpreter

use std::time::Duration;
use xene::interpreter::{Context, RuntimeError};
use xene::memory::value::{equals, to_string, Value};
use xene::parser::{parse, ParseErrorKind};
use xene::{exec, exec_with_input, Error};

const TIMEOUT: Duration = Duration::from_secs(2);

fn run(code: &str) -> Value {
    match exec(code, TIMEOUT) {
        Ok(value) => value,
        Err(e) => panic!("{}\nCode: {}", e, code),
    }
}

fn runtime_error(code: &str) -> RuntimeError {
    match exec(code, TIMEOUT) {
        Err(Error::Runtime(e)) => e,
        Err(other) => panic!("expected a runtime error, got {}\nCode: {}", other, code),
        Ok(value) => panic!("Failed to fail!\nResult: {}\nCode: {}", value, code),
    }
}

fn rendered(code: &str) -> String {
    to_string(&run(code), true)
}

#[test]
fn test_simple_arithmetic() {
    assert_eq!(run("var_x = 5; var_y = 10; var_x + var_y").as_int(), Some(15));
    assert_eq!(
        run("min(3, max(1, 2)) + len(\"hey\") + len([1,2]) + 10 % 4").as_int(),
        Some(9)
    );
}

#[test]
fn test_function_call() {
    let code = "fn_add = function var_a, var_b -> var_a + var_b; fn_add(2, 3)";
    assert_eq!(run(code).as_int(), Some(5));

    let code = "var_f = function var_x -> { var_y = var_x * 2; var_y + 1 }; var_f(4)";
    assert_eq!(run(code).as_int(), Some(9));
}

#[test]
fn test_recursion() {
    let code = "fn_fact = function var_n -> { if var_n <= 1 { return 1 } return var_n * fn_fact(var_n - 1) }; fn_fact(5)";
    assert_eq!(run(code).as_int(), Some(120));
}

#[test]
fn test_closure_keeps_its_scope() {
    let code = "fn_make = function -> { var_c = 0; return function -> { var_c = var_c + 1; return var_c } }; \
                fn_next = fn_make(); fn_next(); fn_next()";
    assert_eq!(run(code).as_int(), Some(2));
}

#[test]
fn test_control_flow() {
    let code = "var_x = 5; if var_x < 3 { \"small\" } else if var_x < 10 { \"medium\" } else { \"large\" }";
    assert_eq!(rendered(code), "\"medium\"");

    let code = "var_a = 1;\nvar_b = 2;\n// comment\nif var_a < var_b { var_a } else { var_b }";
    assert_eq!(run(code).as_int(), Some(1));

    assert_eq!(run("var_i = 0; while var_i < 10 { var_i++ } var_i").as_int(), Some(10));
    assert_eq!(
        run("var_s = 0; foreach var_x in range(4) { var_s = var_s + var_x } var_s").as_int(),
        Some(6)
    );
    assert_eq!(
        rendered("var_last = \"\"; foreach var_c in \"ab\" { var_last = var_c } var_last"),
        "\"b\""
    );
}

#[test]
fn test_foreach_variables_are_iteration_local() {
    let err = runtime_error("foreach var_c in [1] { var_inner = var_c } var_inner");
    assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, .. } if name == "var_inner"));
}

#[test]
fn test_lists() {
    assert_eq!(
        run("var_l = [1, 2, 3]; var_l.push(4); var_l.map(function var_x -> var_x * 2).sum()").as_int(),
        Some(20)
    );
    assert_eq!(
        rendered("var_l = [5, 1, 4]; var_l.filter(function var_x -> var_x > 2).reverse()"),
        "[4, 5]"
    );
    assert_eq!(rendered("var_l = new_list(3); var_l[1] = 7; var_l"), "[0, 7, 0]");
    assert_eq!(rendered("[1, \"a\"] + [[]]"), "[1, \"a\", []]");
    assert!(equals(&run("[1, [2]] == [1, [2]]"), &Value::Bool(true)));
}

#[test]
fn test_list_aliasing() {
    let code = "var_a = [1]; var_b = var_a; var_b[0] = 9; var_a[0]";
    assert_eq!(run(code).as_int(), Some(9));
}

#[test]
fn test_strings() {
    assert_eq!(rendered("\"ab\" + \"cd\""), "\"abcd\"");
    assert_eq!(rendered("\"abc\"[1]"), "\"b\"");
    assert_eq!(run("\"abc\".length").as_int(), Some(3));
    assert_eq!(run("str([1, \"a\", true])").to_string(), "[1, \"a\", true]");
    assert_eq!(run("\"a\\\"b\"").to_string(), "a\"b");
}

#[test]
fn test_assignment_is_an_expression() {
    assert_eq!(run("var_a = var_b = 4; var_a + var_b").as_int(), Some(8));
    assert_eq!(
        run("var_t = true && false || !false; var_t").as_bool(),
        Some(true)
    );
}

#[test]
fn test_runtime_errors() {
    assert!(matches!(
        runtime_error("var_nope"),
        RuntimeError::UndefinedVariable { .. }
    ));
    assert!(matches!(
        runtime_error("1 / 0"),
        RuntimeError::DivisionByZero { .. }
    ));
    assert!(matches!(
        runtime_error("9223372036854775807 + 1"),
        RuntimeError::IntegerOverflow { .. }
    ));
    assert!(matches!(
        runtime_error("var_l = [1]; var_l[3]"),
        RuntimeError::IndexOutOfBounds { index: 3, len: 1, .. }
    ));
    assert!(matches!(runtime_error("1(2)"), RuntimeError::NotCallable { .. }));
    assert!(matches!(
        runtime_error("(function var_a -> var_a)(1, 2)"),
        RuntimeError::ArgumentCountMismatch { expected: 1, got: 2, .. }
    ));
    assert!(matches!(
        runtime_error("if 1 { 2 }"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        runtime_error("while false { }"),
        RuntimeError::NoValue { .. }
    ));
    assert!(matches!(
        runtime_error("fn_missing(1)"),
        RuntimeError::UnknownFunction { .. }
    ));
    assert!(matches!(
        runtime_error("[1].nope"),
        RuntimeError::UnknownMember { .. }
    ));
}

#[test]
fn test_error_messages_carry_lines() {
    let err = runtime_error("var_a = 1;\nvar_b");
    assert_eq!(err.to_string(), "Undefined variable 'var_b' at line 2");
}

#[test]
fn test_input_binding() {
    let value = exec_with_input("input + 1", Value::Int(41), TIMEOUT).unwrap();
    assert_eq!(value.as_int(), Some(42));
}

#[test]
fn test_context_reuse_and_isolation() {
    let program = parse("var_count = var_count + 1; var_count").unwrap();

    let mut ctx = Context::new(TIMEOUT);
    ctx.set("var_count", Value::Int(0));
    assert_eq!(ctx.call(&program, vec![]).unwrap().as_int(), Some(1));
    assert_eq!(ctx.call(&program, vec![]).unwrap().as_int(), Some(2));

    let mut fresh = Context::new(TIMEOUT);
    assert!(matches!(
        fresh.call(&program, vec![]),
        Err(RuntimeError::UndefinedVariable { .. })
    ));
}

#[test]
fn test_concurrent_contexts_do_not_interfere() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                exec_with_input(
                    "var_s = 0; foreach var_x in range(input) { var_s = var_s + var_x } var_s",
                    Value::Int(10 * (i + 1)),
                    TIMEOUT,
                )
                .unwrap()
                .as_int()
            })
        })
        .collect();
    let sums: Vec<Option<i64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(sums, vec![Some(45), Some(190), Some(435), Some(780)]);
}

#[test]
fn test_doubled_lists_are_bounded() {
    let build = "var_a = [1]; var_b = [1]; \
                 foreach var_i in range(40) { var_a = [var_a, var_a]; var_b = [var_b, var_b] } ";

    let err = exec(&format!("{}var_a == var_b", build), Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, Error::Runtime(ref e) if e.is_timeout()), "{}", err);

    assert!(matches!(
        runtime_error(&format!("{}str(var_a)", build)),
        RuntimeError::StringTooLarge { .. }
    ));
    assert!(matches!(
        runtime_error("var_s = \"ab\"; foreach var_i in range(30) { var_s = var_s + var_s } var_s"),
        RuntimeError::StringTooLarge { .. }
    ));
}

#[test]
fn test_deep_nesting_is_rejected() {
    let levels = 200_000;
    let source = format!("{}1{}", "(".repeat(levels), ")".repeat(levels));
    match exec(&source, TIMEOUT) {
        Err(Error::Parse(e)) => assert_eq!(e.kind, ParseErrorKind::Semantic, "{}", e),
        Err(other) => panic!("expected a parse error, got {}", other),
        Ok(value) => panic!("Failed to fail!\nResult: {}", value),
    }
    assert_eq!(run("((((((((((7))))))))))").as_int(), Some(7));
}

#[test]
fn test_nested_evaluation_across_calls_is_bounded() {
    let body = format!("{}fn_f(var_n){}", "(".repeat(20), ")".repeat(20));
    let code = format!("fn_f = function var_n -> {}; fn_f(0)", body);
    assert!(matches!(
        runtime_error(&code),
        RuntimeError::EvaluationTooDeep { .. }
    ));
}

#[test]
fn test_deeply_nested_runtime_lists() {
    let build = "var_a = []; var_b = []; \
                 foreach var_i in range(20000) { var_a = [var_a]; var_b = [var_b] } ";
    assert!(matches!(
        runtime_error(&format!("{}var_a == var_b", build)),
        RuntimeError::EvaluationTooDeep { .. }
    ));
    let text = run(&format!("{}str(var_a)", build)).to_string();
    assert!(text.contains("[...]"), "{}", text);
    assert_eq!(run(&format!("{}len(var_a)", build)).as_int(), Some(1));
}
