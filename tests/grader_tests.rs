// Grading harness: JSON envelope and per-case isolation

use std::time::Duration;
use xene::grader::{interpret, interpret_json, GraderConfig, Request, Response, TestCase};

fn case(input: &str, expected: &str) -> TestCase {
    TestCase {
        input: input.to_string(),
        expected: expected.to_string(),
    }
}

#[test]
fn test_request_round_trip_through_json() {
    let body = r#"{
        "Code": "var_s = 0; foreach var_x in input { var_s = var_s + var_x } var_s",
        "Params": [{"I": "[1, 2, 3]", "O": "6"}, {"I": "range(5)", "O": "10"}],
        "HiddenParams": [{"I": "[]", "O": "1"}]
    }"#;
    let encoded = interpret_json(body, &GraderConfig::default()).unwrap();
    let response: Response = serde_json::from_str(&encoded).unwrap();

    assert!(response.success);
    assert!(response.message.is_empty());
    assert!(response.test_case_result.iter().all(|r| r.result));
    assert_eq!(response.hidden_test_case_result.len(), 1);
    assert!(!response.hidden_test_case_result[0].result);
    assert_eq!(
        response.hidden_test_case_result[0].message,
        "Expected \"1\", got \"0\""
    );
    assert_eq!(response.tokens.first().map(String::as_str), Some("var_s"));
    assert_eq!(response.tokens.last().map(String::as_str), Some("var_s"));
}

#[test]
fn test_missing_fields_default_to_empty() {
    let encoded = interpret_json(r#"{"Code": "1"}"#, &GraderConfig::default()).unwrap();
    let response: Response = serde_json::from_str(&encoded).unwrap();
    assert!(response.success);
    assert!(response.test_case_result.is_empty());
    assert_eq!(response.tokens, vec!["1"]);
}

#[test]
fn test_invalid_body_is_an_error() {
    assert!(interpret_json("not json", &GraderConfig::default()).is_err());
}

#[test]
fn test_timed_out_case_does_not_affect_others() {
    let request = Request {
        code: "if input { while true { } } 7".to_string(),
        params: vec![case("true", "7"), case("false", "7")],
        hidden_params: vec![],
    };
    let config = GraderConfig {
        program_timeout: Duration::from_millis(100),
        ..GraderConfig::default()
    };
    let response = interpret(&request, &config);

    let first = &response.test_case_result[0];
    assert!(!first.result);
    assert!(
        first.message.starts_with("Code execution failed: Execution timed out"),
        "{}",
        first.message
    );
    assert!(response.test_case_result[1].result);
}

#[test]
fn test_input_expression_is_bounded() {
    let request = Request {
        code: "input".to_string(),
        params: vec![case("while true { }", "0")],
        hidden_params: vec![],
    };
    let response = interpret(&request, &GraderConfig::default());
    assert!(response.test_case_result[0]
        .message
        .starts_with("Input execution failed: "));
}

#[test]
fn test_string_and_list_outputs() {
    let request = Request {
        code: "[input, \"x\"]".to_string(),
        params: vec![case("\"a\"", "[\"a\", \"x\"]")],
        hidden_params: vec![case("", "[0, \"x\"]")],
    };
    let response = interpret(&request, &GraderConfig::default());
    assert!(response.test_case_result[0].result, "{}", response.test_case_result[0].message);
    assert!(response.hidden_test_case_result[0].result);
}

#[test]
fn test_code_parse_failure_reports_message() {
    let request = Request {
        code: "var_a = ".to_string(),
        params: vec![case("", "0")],
        hidden_params: vec![],
    };
    let response = interpret(&request, &GraderConfig::default());
    assert!(!response.success);
    assert!(response.message.starts_with("Code parsing failed: Syntax error"));
    assert!(response.test_case_result.is_empty());
}
