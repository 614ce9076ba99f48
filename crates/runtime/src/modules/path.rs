//! `path` module: pure path-string manipulation (spec.md §1's
//! filesystem shim group), no I/O performed here.

use super::{module, native_fn};
use crate::util::{bytes_to_string, expect_arity, expect_string};
use std::path::Path;
use zima_core::error::EvalError;
use zima_core::value::Value;

pub fn build() -> Value {
    module(vec![
        ("join", native_fn(join)),
        ("basename", native_fn(basename)),
        ("dirname", native_fn(dirname)),
        ("extension", native_fn(extension)),
        ("is_absolute", native_fn(is_absolute)),
        ("normalize", native_fn(normalize)),
    ])
}

fn arg(args: &[Value], idx: usize, ctx: &str) -> Result<String, EvalError> {
    Ok(bytes_to_string(expect_string(&args[idx], ctx)?))
}

fn join(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "path.join")?;
    let a = arg(args, 0, "path.join")?;
    let b = arg(args, 1, "path.join")?;
    Ok(Value::string(Path::new(&a).join(b).to_string_lossy().into_owned()))
}

fn basename(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "path.basename")?;
    let p = arg(args, 0, "path.basename")?;
    Ok(Value::string(Path::new(&p).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()))
}

fn dirname(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "path.dirname")?;
    let p = arg(args, 0, "path.dirname")?;
    Ok(Value::string(Path::new(&p).parent().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()))
}

fn extension(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "path.extension")?;
    let p = arg(args, 0, "path.extension")?;
    Ok(Value::string(Path::new(&p).extension().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()))
}

fn is_absolute(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "path.is_absolute")?;
    let p = arg(args, 0, "path.is_absolute")?;
    Ok(Value::Bool(Path::new(&p).is_absolute()))
}

fn normalize(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "path.normalize")?;
    let p = arg(args, 0, "path.normalize")?;
    let mut out: Vec<&str> = Vec::new();
    for component in p.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    let rendered = out.join("/");
    Ok(Value::string(if p.starts_with('/') { format!("/{rendered}") } else { rendered }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_and_dirname() {
        let p = Value::string("a/b/c.txt");
        assert_eq!(basename(&[p.clone()]).unwrap(), Value::string("c.txt"));
        assert_eq!(dirname(&[p]).unwrap(), Value::string("a/b"));
    }

    #[test]
    fn normalize_collapses_dot_segments() {
        let p = Value::string("a/./b/../c");
        assert_eq!(normalize(&[p]).unwrap(), Value::string("a/c"));
    }
}
