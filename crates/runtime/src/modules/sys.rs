//! `sys` module: process introspection plus a private environment-
//! variable map (spec.md §6 — distinct from the real OS environment;
//! changes here never leak to spawned OS processes).

use super::{module, native_fn};
use crate::util::{bytes_to_string, expect_arity, expect_string};
use std::collections::HashMap;
use std::sync::Mutex;
use zima_core::error::EvalError;
use zima_core::value::Value;

static PRIVATE_ENV: Mutex<Option<HashMap<String, String>>> = Mutex::new(None);

pub fn build() -> Value {
    module(vec![
        ("args", native_fn(args)),
        ("platform", native_fn(platform)),
        ("getenv", native_fn(getenv)),
        ("setenv", native_fn(setenv)),
        ("unsetenv", native_fn(unsetenv)),
        ("exit", native_fn(exit)),
    ])
}

fn args(a: &[Value]) -> Result<Value, EvalError> {
    expect_arity(a, 0, "sys.args")?;
    Ok(Value::array(std::env::args().skip(1).map(Value::string).collect()))
}

fn platform(a: &[Value]) -> Result<Value, EvalError> {
    expect_arity(a, 0, "sys.platform")?;
    Ok(Value::string(std::env::consts::OS))
}

fn getenv(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "sys.getenv")?;
    let name = bytes_to_string(expect_string(&args[0], "sys.getenv")?);
    let guard = PRIVATE_ENV.lock().unwrap();
    match guard.as_ref().and_then(|m| m.get(&name)) {
        Some(v) => Ok(Value::string(v.clone())),
        None => Ok(Value::Nil),
    }
}

fn setenv(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "sys.setenv")?;
    let name = bytes_to_string(expect_string(&args[0], "sys.setenv")?);
    let value = bytes_to_string(expect_string(&args[1], "sys.setenv")?);
    PRIVATE_ENV.lock().unwrap().get_or_insert_with(HashMap::new).insert(name, value);
    Ok(Value::Nil)
}

fn unsetenv(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "sys.unsetenv")?;
    let name = bytes_to_string(expect_string(&args[0], "sys.unsetenv")?);
    if let Some(map) = PRIVATE_ENV.lock().unwrap().as_mut() {
        map.remove(&name);
    }
    Ok(Value::Nil)
}

fn exit(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "sys.exit")?;
    let code = crate::util::expect_number(&args[0], "sys.exit")? as i32;
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_env_round_trips_without_touching_real_env() {
        setenv(&[Value::string("ZIMA_TEST_KEY"), Value::string("v1")]).unwrap();
        assert_eq!(getenv(&[Value::string("ZIMA_TEST_KEY")]).unwrap(), Value::string("v1"));
        assert!(std::env::var("ZIMA_TEST_KEY").is_err());
        unsetenv(&[Value::string("ZIMA_TEST_KEY")]).unwrap();
        assert_eq!(getenv(&[Value::string("ZIMA_TEST_KEY")]).unwrap(), Value::Nil);
    }
}
