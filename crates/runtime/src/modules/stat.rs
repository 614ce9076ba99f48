//! `stat` module: filesystem metadata queries, kept separate from
//! `fs`'s read/write/directory operations (spec.md §6 lists them as
//! distinct modules).

use super::{module, native_fn};
use crate::util::{bytes_to_string, expect_arity, expect_string};
use std::time::UNIX_EPOCH;
use zima_core::error::EvalError;
use zima_core::value::Value;

pub fn build() -> Value {
    module(vec![
        ("size", native_fn(size)),
        ("modified", native_fn(modified)),
        ("is_dir", native_fn(is_dir)),
        ("is_file", native_fn(is_file)),
        ("exists", native_fn(exists)),
    ])
}

fn path_arg(args: &[Value]) -> Result<String, EvalError> {
    Ok(bytes_to_string(expect_string(&args[0], "stat")?))
}

fn size(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "stat.size")?;
    let path = path_arg(args)?;
    let meta = std::fs::metadata(&path).map_err(|_| EvalError::FileNotFound(path))?;
    Ok(Value::Number(meta.len() as f64))
}

fn modified(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "stat.modified")?;
    let path = path_arg(args)?;
    let meta = std::fs::metadata(&path).map_err(|_| EvalError::FileNotFound(path))?;
    let secs = meta.modified().ok().and_then(|t| t.duration_since(UNIX_EPOCH).ok()).map(|d| d.as_secs_f64()).unwrap_or(0.0);
    Ok(Value::Number(secs))
}

fn is_dir(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "stat.is_dir")?;
    Ok(Value::Bool(std::path::Path::new(&path_arg(args)?).is_dir()))
}

fn is_file(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "stat.is_file")?;
    Ok(Value::Bool(std::path::Path::new(&path_arg(args)?).is_file()))
}

fn exists(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "stat.exists")?;
    Ok(Value::Bool(std::path::Path::new(&path_arg(args)?).exists()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_of_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, "hello").unwrap();
        let path = Value::string(file.to_string_lossy().into_owned());
        assert_eq!(size(&[path]).unwrap(), Value::Number(5.0));
    }
}
