//! `string` module: byte-string utilities over `Value::Str` (spec.md
//! §3.1 — strings are opaque bytes, printed "UTF-8-ish").

use super::{module, native_fn};
use crate::util::{bytes_to_string, expect_arity, expect_number, expect_string};
use zima_core::error::EvalError;
use zima_core::value::Value;

pub fn build() -> Value {
    module(vec![
        ("len", native_fn(len)),
        ("upper", native_fn(upper)),
        ("lower", native_fn(lower)),
        ("trim", native_fn(trim)),
        ("split", native_fn(split)),
        ("join", native_fn(join)),
        ("replace", native_fn(replace)),
        ("contains", native_fn(contains)),
        ("starts_with", native_fn(starts_with)),
        ("ends_with", native_fn(ends_with)),
        ("index_of", native_fn(index_of)),
        ("substring", native_fn(substring)),
        ("concat", native_fn(concat)),
        ("repeat", native_fn(repeat)),
        ("to_number", native_fn(to_number)),
        ("from_number", native_fn(from_number)),
        ("char_at", native_fn(char_at)),
        ("bytes", native_fn(bytes)),
        ("from_bytes", native_fn(from_bytes)),
    ])
}

fn len(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.len")?;
    Ok(Value::Number(expect_string(&args[0], "string.len")?.len() as f64))
}

fn upper(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.upper")?;
    Ok(Value::string(bytes_to_string(expect_string(&args[0], "string.upper")?).to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.lower")?;
    Ok(Value::string(bytes_to_string(expect_string(&args[0], "string.lower")?).to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.trim")?;
    Ok(Value::string(bytes_to_string(expect_string(&args[0], "string.trim")?).trim().to_string()))
}

fn split(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.split")?;
    let s = bytes_to_string(expect_string(&args[0], "string.split")?);
    let sep = bytes_to_string(expect_string(&args[1], "string.split")?);
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        s.split(sep.as_str()).map(Value::string).collect()
    };
    Ok(Value::array(parts))
}

fn join(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.join")?;
    let items = crate::util::expect_array(&args[0], "string.join")?;
    let sep = bytes_to_string(expect_string(&args[1], "string.join")?);
    let parts: Vec<String> =
        items.iter().map(|v| expect_string(v, "string.join")).collect::<Result<Vec<_>, _>>()?.into_iter().map(bytes_to_string).collect();
    Ok(Value::string(parts.join(&sep)))
}

fn replace(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 3, "string.replace")?;
    let s = bytes_to_string(expect_string(&args[0], "string.replace")?);
    let from = bytes_to_string(expect_string(&args[1], "string.replace")?);
    let to = bytes_to_string(expect_string(&args[2], "string.replace")?);
    Ok(Value::string(s.replace(&from, &to)))
}

fn contains(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.contains")?;
    let s = bytes_to_string(expect_string(&args[0], "string.contains")?);
    let needle = bytes_to_string(expect_string(&args[1], "string.contains")?);
    Ok(Value::Bool(s.contains(&needle)))
}

fn starts_with(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.starts_with")?;
    let s = bytes_to_string(expect_string(&args[0], "string.starts_with")?);
    let prefix = bytes_to_string(expect_string(&args[1], "string.starts_with")?);
    Ok(Value::Bool(s.starts_with(&prefix)))
}

fn ends_with(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.ends_with")?;
    let s = bytes_to_string(expect_string(&args[0], "string.ends_with")?);
    let suffix = bytes_to_string(expect_string(&args[1], "string.ends_with")?);
    Ok(Value::Bool(s.ends_with(&suffix)))
}

fn index_of(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.index_of")?;
    let s = bytes_to_string(expect_string(&args[0], "string.index_of")?);
    let needle = bytes_to_string(expect_string(&args[1], "string.index_of")?);
    match s.find(&needle) {
        Some(i) => Ok(Value::Number(i as f64)),
        None => Ok(Value::Number(-1.0)),
    }
}

fn substring(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 3, "string.substring")?;
    let bytes = expect_string(&args[0], "string.substring")?;
    let start = expect_number(&args[1], "string.substring")?.floor() as i64;
    let end = expect_number(&args[2], "string.substring")?.floor() as i64;
    let len = bytes.len() as i64;
    let start = start.clamp(0, len) as usize;
    let end = end.clamp(0, len) as usize;
    if start >= end {
        return Ok(Value::string(Vec::new()));
    }
    Ok(Value::string(bytes[start..end].to_vec()))
}

fn concat(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.concat")?;
    let mut a = expect_string(&args[0], "string.concat")?;
    let b = expect_string(&args[1], "string.concat")?;
    a.extend(b);
    Ok(Value::string(a))
}

fn repeat(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.repeat")?;
    let bytes = expect_string(&args[0], "string.repeat")?;
    let n = expect_number(&args[1], "string.repeat")?;
    if n < 0.0 {
        return Err(EvalError::OutOfBounds { index: n as i64, len: 0, context: "string.repeat".into() });
    }
    Ok(Value::string(bytes.repeat(n as usize)))
}

fn to_number(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.to_number")?;
    let s = bytes_to_string(expect_string(&args[0], "string.to_number")?);
    s.trim().parse::<f64>().map(Value::Number).map_err(|_| EvalError::TypeMismatch {
        expected: "a numeric string".into(),
        got: s,
        context: "string.to_number".into(),
    })
}

fn from_number(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.from_number")?;
    let n = expect_number(&args[0], "string.from_number")?;
    Ok(Value::string(zima_core::value::format_number(n)))
}

fn char_at(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "string.char_at")?;
    let bytes = expect_string(&args[0], "string.char_at")?;
    let idx = crate::util::index_to_usize(expect_number(&args[1], "string.char_at")?, bytes.len(), "string.char_at")?;
    Ok(Value::string(vec![bytes[idx]]))
}

fn bytes(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.bytes")?;
    let b = expect_string(&args[0], "string.bytes")?;
    Ok(Value::array(b.into_iter().map(|byte| Value::Number(byte as f64)).collect()))
}

fn from_bytes(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "string.from_bytes")?;
    let items = crate::util::expect_array(&args[0], "string.from_bytes")?;
    let bytes: Vec<u8> =
        items.iter().map(|v| expect_number(v, "string.from_bytes").map(|n| n as u8)).collect::<Result<_, _>>()?;
    Ok(Value::string(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_and_join_round_trip() {
        let s = Value::string("a,b,c");
        let parts = split(&[s, Value::string(",")]).unwrap();
        let joined = join(&[parts, Value::string("-")]).unwrap();
        assert_eq!(joined, Value::string("a-b-c"));
    }

    #[test]
    fn substring_clamps_bounds() {
        let s = Value::string("hello world");
        let sub = substring(&[s, Value::Number(6.0), Value::Number(100.0)]).unwrap();
        assert_eq!(sub, Value::string("world"));
    }
}
