//! `json` module: parse/stringify between script `Value`s and JSON
//! text, via `serde_json` (teacher's `seq-runtime` carries the same
//! crate for its own `report-json` feature).

use super::{module, native_fn};
use crate::util::{bytes_to_string, expect_arity, expect_bool, expect_string};
use zima_core::error::EvalError;
use zima_core::value::{OrderedMap, Value};

pub fn build() -> Value {
    module(vec![("parse", native_fn(parse)), ("stringify", native_fn(stringify))])
}

fn parse(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "json.parse")?;
    let text = bytes_to_string(expect_string(&args[0], "json.parse")?);
    let parsed: serde_json::Value = serde_json::from_str(&text).map_err(|e| EvalError::InvalidFileFormat(format!("invalid json: {e}")))?;
    Ok(from_json(&parsed))
}

fn stringify(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() || args.len() > 2 {
        return Err(EvalError::ArityMismatch { expected: 1, got: args.len(), context: "json.stringify".into() });
    }
    let pretty = if args.len() == 2 { expect_bool(&args[1], "json.stringify")? } else { false };
    let json = to_json(&args[0]);
    let text = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
    .map_err(|e| EvalError::InvalidFileFormat(e.to_string()))?;
    Ok(Value::string(text))
}

fn from_json(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s.clone()),
        serde_json::Value::Array(items) => Value::array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(obj) => {
            let mut map = OrderedMap::new();
            for (k, v) in obj {
                map.insert(k.clone(), from_json(v));
            }
            Value::object(map)
        }
    }
}

fn to_json(v: &Value) -> serde_json::Value {
    match v.deref() {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Number(n) => serde_json::Number::from_f64(n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(bytes_to_string((*s).clone())),
        Value::Array(items) => serde_json::Value::Array(items.lock().unwrap().iter().map(to_json).collect()),
        Value::Object(map) => {
            let mut obj = serde_json::Map::new();
            for (k, val) in map.lock().unwrap().iter() {
                obj.insert(k.clone(), to_json(val));
            }
            serde_json::Value::Object(obj)
        }
        other => serde_json::Value::String(zima_core::value::to_string(&other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_object() {
        let text = Value::string(r#"{"a": 1, "b": [true, null, "x"]}"#);
        let parsed = parse(&[text]).unwrap();
        let back = stringify(&[parsed]).unwrap();
        let reparsed = parse(&[back]).unwrap();
        match reparsed {
            Value::Object(_) => {}
            other => panic!("expected object, got {other:?}"),
        }
    }
}
