//! Integration tests that parse-and-run whole scripts end to end,
//! exercising the lexer, parser, evaluator, and builtin registry
//! together rather than in isolation.

use zima_runtime::{run_source, Writers};

fn run(source: &str) -> (Result<zima_core::value::Value, zima_runtime::RunError>, String, String) {
    let (writers, out, err) = Writers::buffered();
    let result = run_source(source, writers);
    let out = String::from_utf8(out.lock().unwrap().clone()).unwrap();
    let err = String::from_utf8(err.lock().unwrap().clone()).unwrap();
    (result, out, err)
}

#[test]
fn fibonacci_via_recursion() {
    let (result, out, _err) = run(
        r#"
        function fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        println(fib(10));
        "#,
    );
    assert!(result.is_ok());
    assert_eq!(out, "55\n");
}

#[test]
fn foreach_over_array_sums_elements() {
    let (result, out, _err) = run(
        r#"
        let total = 0;
        foreach (x in [1, 2, 3, 4, 5]) {
            total = total + x;
        }
        println(total);
        "#,
    );
    assert!(result.is_ok());
    assert_eq!(out, "15\n");
}

#[test]
fn closures_capture_their_defining_scope() {
    let (result, out, _err) = run(
        r#"
        function make_counter() {
            let count = 0;
            function increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }
        let counter = make_counter();
        println(counter());
        println(counter());
        println(counter());
        "#,
    );
    assert!(result.is_ok());
    assert_eq!(out, "1\n2\n3\n");
}

#[test]
fn const_rebinding_is_a_runtime_error() {
    let (result, _out, _err) = run(
        r#"
        const x = 1;
        x = 2;
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn container_stack_behaves_lifo_across_script_boundary() {
    let (result, out, _err) = run(
        r#"
        let s = new stack();
        s.push(1);
        s.push(2);
        s.push(3);
        println(s.pop());
        println(s.pop());
        println(s.pop());
        "#,
    );
    assert!(result.is_ok());
    assert_eq!(out, "3\n2\n1\n");
}

#[test]
fn undefined_identifier_reports_as_eval_error() {
    let (result, _out, _err) = run("println(does_not_exist);");
    assert!(matches!(result, Err(zima_runtime::RunError::Eval(_))));
}

#[test]
fn syntax_errors_surface_as_parse_errors() {
    let (result, _out, _err) = run("let x = ;");
    assert!(matches!(result, Err(zima_runtime::RunError::Parse(_))));
}
