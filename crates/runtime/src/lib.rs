//! Evaluator (C3), builtin registry (C4), container library (C5) and
//! thin builtin shims (C8) — everything spec.md §2 puts above the
//! value model and below the driver.
//!
//! `install_globals` binds the handful of free functions every script
//! gets without an `import`: `ref`/`len` (spec.md §4.1/§4.5's uniform
//! hooks), and `print`/`println` (spec.md §6's "out" writer). Every
//! other builtin lives behind a module (`import "array"`, ...) or a
//! `new T(...)` std-struct, both reached through the `Registry`.

pub mod containers;
pub mod eval;
pub mod modules;
pub mod registry;
pub mod sqlite;
pub mod thread;
pub mod util;
pub mod writers;

use zima_core::env::Env;
use zima_core::error::EvalError;
use zima_core::value::{Value, to_string};

pub use eval::{call_value, eval_program};
pub use registry::Registry;
pub use writers::Writers;

/// Bind the globals available in every scope without an `import`.
pub fn install_globals(root: &Env, registry: &Registry) {
    root.define("ref", modules::native_fn(eval::builtin_ref));
    root.define("len", modules::native_fn(eval::builtin_len));

    let out = registry.writers.clone();
    root.define(
        "print",
        modules::native_fn(move |args| {
            for a in args {
                out.write_out(&to_string(a));
            }
            Ok(Value::Nil)
        }),
    );

    let out = registry.writers.clone();
    root.define(
        "println",
        modules::native_fn(move |args| {
            for a in args {
                out.write_out(&to_string(a));
            }
            out.write_out("\n");
            Ok(Value::Nil)
        }),
    );
}

/// Parse-and-run a whole script, wiring a fresh root environment with
/// the globals and builtin registry installed. The entry point the CLI
/// driver (and integration tests) call.
pub fn run_source(source: &str, writers: Writers) -> Result<Value, RunError> {
    let program = zima_lang::parse(source).map_err(RunError::Parse)?;
    let registry = Registry::new(writers);
    let root = zima_core::env::Scope::root();
    install_globals(&root, &registry);
    eval_program(&program, &root, &registry).map_err(RunError::Eval)
}

#[derive(Debug)]
pub enum RunError {
    Parse(zima_lang::ParseError),
    Eval(EvalError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Parse(e) => write!(f, "parse error: {e}"),
            RunError::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RunError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn println_writes_to_out_with_trailing_newline() {
        let (writers, out_buf, _err_buf) = Writers::buffered();
        let v = run_source("println(\"hi\");", writers).unwrap();
        assert_eq!(v, Value::Nil);
        assert_eq!(String::from_utf8(out_buf.lock().unwrap().clone()).unwrap(), "hi\n");
    }

    #[test]
    fn stack_scenario_from_spec_examples() {
        let (writers, out_buf, _err_buf) = Writers::buffered();
        run_source(
            "let s = new stack(); s.push(1); s.push(2); s.push(3); println(s.pop()); println(s.peek()); println(s.size());",
            writers,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out_buf.lock().unwrap().clone()).unwrap(), "3\n2\n2\n");
    }

    #[test]
    fn heap_scenario_from_spec_examples() {
        let (writers, out_buf, _err_buf) = Writers::buffered();
        run_source(
            "let h = new heap(true); h.insert(10); h.insert(3); h.insert(8); println(h.poll()); println(h.poll()); println(h.poll());",
            writers,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out_buf.lock().unwrap().clone()).unwrap(), "10\n8\n3\n");
    }
}
