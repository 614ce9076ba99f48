//! `array` module: free functions over plain `array` Values.
//!
//! Deliberately callback-free (no `map`/`filter`/`reduce`): spec.md's
//! `foreach` statement already covers iteration, and a native handler
//! has no path back into the evaluator to invoke a script callback
//! (spec.md §1 scopes higher-order builtins out implicitly by never
//! mentioning them alongside this module).

use super::{module, native_fn};
use crate::util::{expect_array, expect_arity, expect_string};
use zima_core::error::EvalError;
use zima_core::value::{Value, equal, less, to_string};

pub fn build() -> Value {
    module(vec![
        ("sort", native_fn(sort)),
        ("reverse", native_fn(reverse)),
        ("concat", native_fn(concat)),
        ("contains", native_fn(contains)),
        ("index_of", native_fn(index_of)),
        ("slice", native_fn(slice)),
        ("join", native_fn(join)),
        ("flatten", native_fn(flatten)),
        ("unique", native_fn(unique)),
        ("sum", native_fn(sum)),
        ("min", native_fn(min)),
        ("max", native_fn(max)),
        ("fill", native_fn(fill)),
    ])
}

fn sort(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "array.sort")?;
    let mut items = expect_array(&args[0], "array.sort")?;
    items.sort_by(|a, b| if less(a, b) { std::cmp::Ordering::Less } else if equal(a, b) { std::cmp::Ordering::Equal } else { std::cmp::Ordering::Greater });
    Ok(Value::array(items))
}

fn reverse(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "array.reverse")?;
    let mut items = expect_array(&args[0], "array.reverse")?;
    items.reverse();
    Ok(Value::array(items))
}

fn concat(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "array.concat")?;
    let mut a = expect_array(&args[0], "array.concat")?;
    let b = expect_array(&args[1], "array.concat")?;
    a.extend(b);
    Ok(Value::array(a))
}

fn contains(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "array.contains")?;
    let items = expect_array(&args[0], "array.contains")?;
    Ok(Value::Bool(items.iter().any(|v| equal(v, &args[1]))))
}

fn index_of(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "array.index_of")?;
    let items = expect_array(&args[0], "array.index_of")?;
    match items.iter().position(|v| equal(v, &args[1])) {
        Some(i) => Ok(Value::Number(i as f64)),
        None => Ok(Value::Number(-1.0)),
    }
}

fn slice(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 3, "array.slice")?;
    let items = expect_array(&args[0], "array.slice")?;
    let start = crate::util::expect_number(&args[1], "array.slice")?.floor() as i64;
    let end = crate::util::expect_number(&args[2], "array.slice")?.floor() as i64;
    let len = items.len() as i64;
    let start = start.clamp(0, len) as usize;
    let end = end.clamp(0, len) as usize;
    if start >= end {
        return Ok(Value::array(Vec::new()));
    }
    Ok(Value::array(items[start..end].to_vec()))
}

fn join(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "array.join")?;
    let items = expect_array(&args[0], "array.join")?;
    let sep = expect_string(&args[1], "array.join")?;
    let sep = String::from_utf8_lossy(&sep).into_owned();
    let rendered: Vec<String> = items.iter().map(to_string).collect();
    Ok(Value::string(rendered.join(&sep)))
}

fn flatten(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "array.flatten")?;
    let items = expect_array(&args[0], "array.flatten")?;
    let mut out = Vec::new();
    for item in items {
        match item.deref() {
            Value::Array(inner) => out.extend(inner.lock().unwrap().clone()),
            other => out.push(other),
        }
    }
    Ok(Value::array(out))
}

fn unique(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "array.unique")?;
    let items = expect_array(&args[0], "array.unique")?;
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.iter().any(|v| equal(v, &item)) {
            out.push(item);
        }
    }
    Ok(Value::array(out))
}

fn sum(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "array.sum")?;
    let items = expect_array(&args[0], "array.sum")?;
    let total: f64 = items.iter().map(|v| crate::util::expect_number(v, "array.sum")).collect::<Result<Vec<_>, _>>()?.into_iter().sum();
    Ok(Value::Number(total))
}

fn min(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "array.min")?;
    let items = expect_array(&args[0], "array.min")?;
    items
        .into_iter()
        .reduce(|a, b| if less(&b, &a) { b } else { a })
        .ok_or_else(|| EvalError::OutOfBounds { index: 0, len: 0, context: "array.min".into() })
}

fn max(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "array.max")?;
    let items = expect_array(&args[0], "array.max")?;
    items
        .into_iter()
        .reduce(|a, b| if less(&a, &b) { b } else { a })
        .ok_or_else(|| EvalError::OutOfBounds { index: 0, len: 0, context: "array.max".into() })
}

fn fill(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "array.fill")?;
    let n = crate::util::expect_number(&args[1], "array.fill")?.floor() as i64;
    if n < 0 {
        return Err(EvalError::OutOfBounds { index: n, len: 0, context: "array.fill".into() });
    }
    Ok(Value::array(vec![args[0].clone(); n as usize]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_orders_numbers() {
        let arr = Value::array(vec![Value::Number(3.0), Value::Number(1.0), Value::Number(2.0)]);
        let sorted = sort(&[arr]).unwrap();
        assert_eq!(sorted, Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]));
    }

    #[test]
    fn slice_clamps_bounds() {
        let arr = Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        let s = slice(&[arr, Value::Number(1.0), Value::Number(10.0)]).unwrap();
        assert_eq!(s, Value::array(vec![Value::Number(2.0), Value::Number(3.0)]));
    }

    #[test]
    fn unique_deduplicates_preserving_order() {
        let arr = Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(1.0)]);
        let u = unique(&[arr]).unwrap();
        assert_eq!(u, Value::array(vec![Value::Number(1.0), Value::Number(2.0)]));
    }
}
