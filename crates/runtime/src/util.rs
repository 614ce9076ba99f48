//! Argument-validation helpers shared by builtin module handlers and
//! std-struct constructors/methods (spec.md §4.4).
//!
//! Native handlers here receive already-evaluated `Value` arguments
//! (the evaluator evaluates each `arg_expr` in `env` before dispatch),
//! so these helpers validate materialised slices rather than walking
//! unevaluated AST the way the spec's `(arg_exprs, env) -> Value`
//! signature implies.

use zima_core::error::EvalError;
use zima_core::value::Value;

pub fn expect_values<'a>(
    args: &'a [Value],
    n: usize,
    context: &str,
) -> Result<&'a [Value], EvalError> {
    expect_arity(args, n, context)?;
    Ok(args)
}

pub fn expect_arity(args: &[Value], n: usize, context: &str) -> Result<(), EvalError> {
    if args.len() != n {
        return Err(EvalError::ArityMismatch {
            expected: n,
            got: args.len(),
            context: context.to_string(),
        });
    }
    Ok(())
}

pub fn expect_number(v: &Value, context: &str) -> Result<f64, EvalError> {
    match v.deref() {
        Value::Number(n) => Ok(n),
        other => Err(EvalError::TypeMismatch {
            expected: "number".into(),
            got: other.type_name().into(),
            context: context.to_string(),
        }),
    }
}

pub fn expect_bool(v: &Value, context: &str) -> Result<bool, EvalError> {
    match v.deref() {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::TypeMismatch {
            expected: "boolean".into(),
            got: other.type_name().into(),
            context: context.to_string(),
        }),
    }
}

pub fn expect_string(v: &Value, context: &str) -> Result<Vec<u8>, EvalError> {
    match v.deref() {
        Value::Str(s) => Ok((*s).clone()),
        other => Err(EvalError::TypeMismatch {
            expected: "string".into(),
            got: other.type_name().into(),
            context: context.to_string(),
        }),
    }
}

pub fn expect_array(v: &Value, context: &str) -> Result<Vec<Value>, EvalError> {
    match v.deref() {
        Value::Array(a) => Ok(a.lock().unwrap().clone()),
        other => Err(EvalError::TypeMismatch {
            expected: "array".into(),
            got: other.type_name().into(),
            context: context.to_string(),
        }),
    }
}

pub fn expect_number_args(args: &[Value], context: &str) -> Result<Vec<f64>, EvalError> {
    args.iter().map(|a| expect_number(a, context)).collect()
}

pub fn expect_string_args(args: &[Value], context: &str) -> Result<Vec<Vec<u8>>, EvalError> {
    args.iter().map(|a| expect_string(a, context)).collect()
}

pub fn expect_array_args(args: &[Value], context: &str) -> Result<Vec<Vec<Value>>, EvalError> {
    args.iter().map(|a| expect_array(a, context)).collect()
}

pub fn expect_number_arrays(args: &[Value], context: &str) -> Result<Vec<Vec<f64>>, EvalError> {
    args.iter()
        .map(|a| {
            let items = expect_array(a, context)?;
            items.iter().map(|x| expect_number(x, context)).collect()
        })
        .collect()
}

/// Truncate a number to a usize index, bounds-checked against `len`.
pub fn index_to_usize(n: f64, len: usize, context: &str) -> Result<usize, EvalError> {
    let idx = n.floor() as i64;
    if idx < 0 || idx as usize >= len {
        return Err(EvalError::OutOfBounds { index: idx, len, context: context.to_string() });
    }
    Ok(idx as usize)
}

/// Same as `index_to_usize` but allows `idx == len` (insertion point).
pub fn insertion_index(n: f64, len: usize, context: &str) -> Result<usize, EvalError> {
    let idx = n.floor() as i64;
    if idx < 0 || idx as usize > len {
        return Err(EvalError::OutOfBounds { index: idx, len, context: context.to_string() });
    }
    Ok(idx as usize)
}

pub fn bytes_to_string(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}
