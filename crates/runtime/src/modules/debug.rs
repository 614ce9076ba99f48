//! `debug` module: diagnostics routed through the err writer and
//! `tracing`, not raw `eprintln!` (spec.md §6's two process-wide
//! writers own all diagnostic output).

use super::{module, native_fn};
use crate::util::expect_arity;
use crate::writers::Writers;
use zima_core::error::EvalError;
use zima_core::value::{Value, to_string, truthy};

pub fn build(writers: Writers) -> Value {
    let w1 = writers.clone();
    let w2 = writers.clone();
    module(vec![
        (
            "print",
            native_fn(move |args| {
                expect_arity(args, 1, "debug.print")?;
                w1.write_err(&format!("{:?}\n", to_string(&args[0])));
                Ok(Value::Nil)
            }),
        ),
        (
            "assert",
            native_fn(move |args| {
                if args.is_empty() || args.len() > 2 {
                    return Err(EvalError::ArityMismatch { expected: 1, got: args.len(), context: "debug.assert".into() });
                }
                if !truthy(&args[0]) {
                    let msg = if args.len() == 2 { to_string(&args[1]) } else { "assertion failed".to_string() };
                    w2.write_err(&format!("{msg}\n"));
                    return Err(EvalError::TypeMismatch { expected: "truthy value".into(), got: "falsy value".into(), context: msg });
                }
                Ok(Value::Nil)
            }),
        ),
        (
            "trace",
            native_fn(|args| {
                expect_arity(args, 1, "debug.trace")?;
                tracing::debug!(message = %to_string(&args[0]), "script trace");
                Ok(Value::Nil)
            }),
        ),
    ])
}
