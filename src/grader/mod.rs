//! Test-case grading harness
//!
//! Runs a submitted program against a list of input/expected-output pairs.
//! The request and response use the JSON envelope of the grading service
//! (`Code`, `Params`, `HiddenParams` in; `Success`, `TestCaseResult`,
//! `HiddenTestCaseResult`, `Tokens`, `Message` out).
//!
//! Each case runs in its own [`Context`], so one failing or timed-out case
//! never affects another.

use crate::interpreter::constants::{DEFAULT_TIMEOUT, INPUT_TIMEOUT};
use crate::interpreter::Context;
use crate::memory::value::{quote, Value};
use crate::parser::{parse, tokens};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One input/expected-output pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Source of an expression producing the input; empty means `0`
    #[serde(rename = "I", default)]
    pub input: String,
    #[serde(rename = "O", default)]
    pub expected: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Params", default)]
    pub params: Vec<TestCase>,
    #[serde(rename = "HiddenParams", default)]
    pub hidden_params: Vec<TestCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    #[serde(rename = "Result")]
    pub result: bool,
    #[serde(rename = "Message")]
    pub message: String,
}

impl TestCaseResult {
    fn pass() -> Self {
        TestCaseResult {
            result: true,
            message: String::new(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        TestCaseResult {
            result: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(rename = "TestCaseResult")]
    pub test_case_result: Vec<TestCaseResult>,
    #[serde(rename = "HiddenTestCaseResult")]
    pub hidden_test_case_result: Vec<TestCaseResult>,
    #[serde(rename = "Tokens")]
    pub tokens: Vec<String>,
    #[serde(rename = "Message")]
    pub message: String,
}

impl Response {
    fn failure(message: impl Into<String>) -> Self {
        Response {
            success: false,
            message: message.into(),
            ..Response::default()
        }
    }
}

/// Timeouts for grading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraderConfig {
    /// Bound on one run of the submitted program
    pub program_timeout: Duration,
    /// Bound on evaluating a test case's input expression
    pub input_timeout: Duration,
}

impl Default for GraderConfig {
    fn default() -> Self {
        GraderConfig {
            program_timeout: DEFAULT_TIMEOUT,
            input_timeout: INPUT_TIMEOUT,
        }
    }
}

/// Grade a request: parse the code once, then run every visible and hidden case
pub fn interpret(request: &Request, config: &GraderConfig) -> Response {
    let program = match parse(&request.code) {
        Ok(program) => program,
        Err(e) => return Response::failure(format!("Code parsing failed: {}", e)),
    };
    let Some(callable) = program.as_callable() else {
        return Response::failure("Parsed code is not callable");
    };

    let tokens = tokens(callable).map(|t| t.lit).collect();
    let run_all = |cases: &[TestCase]| -> Vec<TestCaseResult> {
        cases
            .iter()
            .map(|case| run_test_case(&program, case, config))
            .collect()
    };

    Response {
        success: true,
        test_case_result: run_all(&request.params),
        hidden_test_case_result: run_all(&request.hidden_params),
        tokens,
        message: String::new(),
    }
}

/// Run one case against a parsed program in a fresh context
pub fn run_test_case(program: &Value, case: &TestCase, config: &GraderConfig) -> TestCaseResult {
    if !program.is_callable() {
        return TestCaseResult::fail("Parsed code is not callable");
    }

    let input = if case.input.is_empty() {
        Value::Int(0)
    } else {
        let input_code = match parse(&case.input) {
            Ok(code) => code,
            Err(e) => return TestCaseResult::fail(format!("Input parsing failed: {}", e)),
        };
        match Context::new(config.input_timeout).call(&input_code, Vec::new()) {
            Ok(value) => value,
            Err(e) => return TestCaseResult::fail(format!("Input execution failed: {}", e)),
        }
    };

    let mut ctx = Context::new(config.program_timeout);
    ctx.set_input(input);
    let output = match ctx.call_rendered(program, Vec::new(), true) {
        Ok(text) => text,
        Err(e) => return TestCaseResult::fail(format!("Code execution failed: {}", e)),
    };

    if output == case.expected {
        TestCaseResult::pass()
    } else {
        TestCaseResult::fail(format!(
            "Expected {}, got {}",
            quote(&case.expected),
            quote(&output)
        ))
    }
}

/// Grade a JSON request body and encode the response
pub fn interpret_json(body: &str, config: &GraderConfig) -> serde_json::Result<String> {
    let request: Request = serde_json::from_str(body)?;
    serde_json::to_string(&interpret(&request, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(input: &str, expected: &str) -> TestCase {
        TestCase {
            input: input.to_string(),
            expected: expected.to_string(),
        }
    }

    #[test]
    fn test_passing_and_failing_cases() {
        let request = Request {
            code: "input * 2".to_string(),
            params: vec![case("21", "42"), case("", "0"), case("1", "3")],
            hidden_params: vec![case("[1][0] + 1", "4")],
        };
        let response = interpret(&request, &GraderConfig::default());
        assert!(response.success);
        let results: Vec<bool> = response.test_case_result.iter().map(|r| r.result).collect();
        assert_eq!(results, vec![true, true, false]);
        assert_eq!(response.test_case_result[2].message, "Expected \"3\", got \"2\"");
        assert!(response.hidden_test_case_result[0].result);
        assert_eq!(response.tokens, vec!["input", "*", "2"]);
    }

    #[test]
    fn test_code_parse_failure() {
        let request = Request {
            code: "!!true".to_string(),
            ..Request::default()
        };
        let response = interpret(&request, &GraderConfig::default());
        assert!(!response.success);
        assert!(response.message.starts_with("Code parsing failed: "));
        assert!(response.tokens.is_empty());
    }

    #[test]
    fn test_string_output_is_quoted() {
        let program = parse("\"a\" + str(input)").unwrap();
        let result = run_test_case(&program, &case("1", "\"a1\""), &GraderConfig::default());
        assert!(result.result, "{}", result.message);
    }

    #[test]
    fn test_input_failures() {
        let program = parse("input").unwrap();
        let config = GraderConfig::default();

        let parse_fail = run_test_case(&program, &case("1 +", "1"), &config);
        assert!(parse_fail.message.starts_with("Input parsing failed: "));

        let exec_fail = run_test_case(&program, &case("var_nope", "1"), &config);
        assert!(exec_fail.message.starts_with("Input execution failed: "));
    }

    #[test]
    fn test_execution_failure_is_isolated() {
        let request = Request {
            code: "10 / input".to_string(),
            params: vec![case("0", "0"), case("5", "2")],
            hidden_params: vec![],
        };
        let response = interpret(&request, &GraderConfig::default());
        assert!(response.test_case_result[0]
            .message
            .starts_with("Code execution failed: "));
        assert!(response.test_case_result[1].result);
    }

    #[test]
    fn test_huge_output_stays_within_the_timeout() {
        let program =
            parse("var_l = [1]; foreach var_i in range(26) { var_l = [var_l, var_l] } var_l").unwrap();
        let config = GraderConfig {
            program_timeout: Duration::from_millis(100),
            ..GraderConfig::default()
        };
        let started = std::time::Instant::now();
        let result = run_test_case(&program, &case("", "[1]"), &config);
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
        assert!(!result.result);
        assert!(result.message.starts_with("Code execution failed: "), "{}", result.message);
    }

    #[test]
    fn test_json_envelope() {
        let body = r#"{"Code": "input + 1", "Params": [{"I": "1", "O": "2"}]}"#;
        let encoded = interpret_json(body, &GraderConfig::default()).unwrap();
        let response: Response = serde_json::from_str(&encoded).unwrap();
        assert!(response.success);
        assert!(response.test_case_result[0].result);
        assert!(encoded.contains("\"HiddenTestCaseResult\":[]"));
    }
}
