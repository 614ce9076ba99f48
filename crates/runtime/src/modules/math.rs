//! `math` module: one-line wrappers over `f64` math-library primitives
//! (spec.md §1 names these as out-of-scope pure-math shims).

use super::{module, native_fn};
use crate::util::{expect_arity, expect_number};
use zima_core::error::EvalError;
use zima_core::value::Value;

pub fn build() -> Value {
    module(vec![
        ("pi", Value::Number(std::f64::consts::PI)),
        ("e", Value::Number(std::f64::consts::E)),
        ("abs", native_fn(|a| unary(a, "math.abs", f64::abs))),
        ("floor", native_fn(|a| unary(a, "math.floor", f64::floor))),
        ("ceil", native_fn(|a| unary(a, "math.ceil", f64::ceil))),
        ("round", native_fn(|a| unary(a, "math.round", f64::round))),
        ("trunc", native_fn(|a| unary(a, "math.trunc", f64::trunc))),
        ("sqrt", native_fn(|a| unary(a, "math.sqrt", f64::sqrt))),
        ("exp", native_fn(|a| unary(a, "math.exp", f64::exp))),
        ("ln", native_fn(|a| unary(a, "math.ln", f64::ln))),
        ("log2", native_fn(|a| unary(a, "math.log2", f64::log2))),
        ("log10", native_fn(|a| unary(a, "math.log10", f64::log10))),
        ("sin", native_fn(|a| unary(a, "math.sin", f64::sin))),
        ("cos", native_fn(|a| unary(a, "math.cos", f64::cos))),
        ("tan", native_fn(|a| unary(a, "math.tan", f64::tan))),
        ("pow", native_fn(pow)),
        ("min", native_fn(min)),
        ("max", native_fn(max)),
    ])
}

fn unary(args: &[Value], ctx: &str, f: fn(f64) -> f64) -> Result<Value, EvalError> {
    expect_arity(args, 1, ctx)?;
    Ok(Value::Number(f(expect_number(&args[0], ctx)?)))
}

fn pow(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "math.pow")?;
    let base = expect_number(&args[0], "math.pow")?;
    let exp = expect_number(&args[1], "math.pow")?;
    Ok(Value::Number(base.powf(exp)))
}

fn min(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "math.min")?;
    let a = expect_number(&args[0], "math.min")?;
    let b = expect_number(&args[1], "math.min")?;
    Ok(Value::Number(a.min(b)))
}

fn max(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "math.max")?;
    let a = expect_number(&args[0], "math.max")?;
    let b = expect_number(&args[1], "math.max")?;
    Ok(Value::Number(a.max(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_raises_to_exponent() {
        assert_eq!(pow(&[Value::Number(2.0), Value::Number(10.0)]).unwrap(), Value::Number(1024.0));
    }

    #[test]
    fn abs_handles_negative() {
        assert_eq!(unary(&[Value::Number(-3.0)], "math.abs", f64::abs).unwrap(), Value::Number(3.0));
    }
}
