use proptest::prelude::*;
use std::time::Duration;
use xene::exec;
use xene::memory::value::{equals, Value};
use xene::parser::Parser;

const TIMEOUT: Duration = Duration::from_secs(2);
const MAX_INPUT_BYTES: usize = 128;

fn eval(code: &str) -> Value {
    match exec(code, TIMEOUT) {
        Ok(value) => value,
        Err(e) => panic!("{}\nCode: {}", e, code),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn double_negation_is_identity(n in -1_000_000i64..1_000_000) {
        let value = eval(&format!("-(-({}))", n));
        prop_assert!(equals(&value, &Value::Int(n)), "got {}", value);
    }

    #[test]
    fn negating_a_variable_matches_literal(n in -1_000_000i64..1_000_000) {
        let value = eval(&format!("var_x = ({}); -var_x", n));
        prop_assert_eq!(value.as_int(), Some(-n));
    }

    #[test]
    fn logical_not_complements(b in any::<bool>()) {
        let value = eval(&format!("!({})", b));
        prop_assert_eq!(value.as_bool(), Some(!b));
    }

    #[test]
    fn double_bang_never_parses(b in any::<bool>()) {
        let code = format!("!!{}", b);
        prop_assert!(exec(&code, TIMEOUT).is_err());
    }

    #[test]
    fn post_increment_yields_old_value(n in -1_000_000i64..1_000_000) {
        prop_assert_eq!(eval(&format!("var_x = ({}); var_x++", n)).as_int(), Some(n));
        prop_assert_eq!(eval(&format!("var_x = ({}); var_x++; var_x", n)).as_int(), Some(n + 1));
    }

    #[test]
    fn post_decrement_yields_old_value(n in -1_000_000i64..1_000_000) {
        prop_assert_eq!(eval(&format!("var_x = ({}); var_x--", n)).as_int(), Some(n));
        prop_assert_eq!(eval(&format!("var_x = ({}); var_x--; var_x", n)).as_int(), Some(n - 1));
    }

    #[test]
    fn list_element_increments_in_place(n in -1_000i64..1_000, len in 1usize..8) {
        let index = len - 1;
        let code = format!("var_l = new_list({}); var_l[{}] = ({}); var_l[{}]++; var_l[{}]", len, index, n, index, index);
        prop_assert_eq!(eval(&code).as_int(), Some(n + 1));
    }

    #[test]
    fn decrement_then_subtract_chains(n in -1_000i64..1_000, m in 0i64..1_000) {
        let code = format!("var_a = ({}); var_r = var_a---{}; [var_r, var_a]", n, m);
        let expected = Value::list(vec![Value::Int(n - m), Value::Int(n - 1)]);
        let value = eval(&code);
        prop_assert!(equals(&value, &expected), "got {}", value);
    }

    #[test]
    fn literal_increment_is_rejected(n in 0i64..1_000_000) {
        let increment = exec(&format!("{}++", n), TIMEOUT);
        prop_assert!(increment.is_err());
        let chained = exec(&format!("{}---1", n), TIMEOUT);
        prop_assert!(chained.is_err());
    }

    #[test]
    fn parser_handles_lossy_utf8_without_panicking(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_BYTES)
    ) {
        let input = String::from_utf8_lossy(&bytes).into_owned();
        let _ = Parser::new(&input).parse();
    }
}
