//! End-to-end tests that run whole `.kira` programs through the crate's
//! public entry point and assert on the resulting value.

use kira::{run, Environment, Value};

fn run_fixture(path: &str) -> Value {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| panic!("{path}: {e}"));
    let env = Environment::new();
    run(&source, &env).unwrap_or_else(|e| panic!("{path}: {e}"))
}

#[test]
fn test_fib_fixture_returns_55() {
    // fib(10) printed by the fixture itself; println returns null, so the
    // program's own value is null. The real assertion is that it doesn't
    // error and prints the right thing, which the next test covers more
    // directly without a fixture file.
    assert_eq!(run_fixture("demos/fib.kira"), Value::Null);
}

#[test]
fn test_fib_value_directly() {
    let env = Environment::new();
    let source = r#"
        fn fib(n) {
            if n < 2 {
                return n;
            }
            fib(n - 1) + fib(n - 2);
        }
        fib(10);
    "#;
    assert_eq!(run(source, &env).unwrap(), Value::Integer(55));
}

#[test]
fn test_closures_fixture_runs() {
    run_fixture("demos/closures.kira");
}

#[test]
fn test_bindings_persist_across_separate_run_calls_on_same_env() {
    let env = Environment::new();
    run("let x = 10;", &env).unwrap();
    let result = run("x * 2;", &env).unwrap();
    assert_eq!(result, Value::Integer(20));
}

#[test]
fn test_lexer_error_surfaces_through_run() {
    let env = Environment::new();
    let err = run("let x = @;", &env).unwrap_err();
    assert!(matches!(err, kira::KiraError::Lexer(_)));
}

#[test]
fn test_parser_error_surfaces_through_run() {
    let env = Environment::new();
    let err = run("let = 5;", &env).unwrap_err();
    assert!(matches!(err, kira::KiraError::Parser(_)));
}

#[test]
fn test_runtime_error_surfaces_through_run() {
    let env = Environment::new();
    let err = run("1 / 0;", &env).unwrap_err();
    assert!(matches!(err, kira::KiraError::Runtime(_)));
}

#[test]
fn test_array_and_dict_builtins_end_to_end() {
    let env = Environment::new();
    let source = r#"
        let nums = [3, 1, 4, 1, 5];
        let total = sum(nums);
        let top = max(nums);
        let d = {"total": total, "top": top};
        d["total"] + d["top"];
    "#;
    assert_eq!(run(source, &env).unwrap(), Value::Integer(19));
}

#[test]
fn test_for_loop_with_break_and_continue() {
    let env = Environment::new();
    let source = r#"
        let found = null;
        for x in range(20) {
            if x % 2 != 0 {
                continue;
            }
            if x > 10 {
                break;
            }
            found = x;
        }
        found;
    "#;
    assert_eq!(run(source, &env).unwrap(), Value::Integer(10));
}
