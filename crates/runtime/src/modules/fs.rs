//! `fs` module: thin wrappers over filesystem I/O (spec.md §1 names
//! this as an out-of-scope shim over host-OS primitives).

use super::{module, native_fn};
use crate::util::{bytes_to_string, expect_arity, expect_string};
use zima_core::error::EvalError;
use zima_core::value::Value;

pub fn build() -> Value {
    module(vec![
        ("read_file", native_fn(read_file)),
        ("write_file", native_fn(write_file)),
        ("append_file", native_fn(append_file)),
        ("exists", native_fn(exists)),
        ("remove_file", native_fn(remove_file)),
        ("create_dir", native_fn(create_dir)),
        ("remove_dir", native_fn(remove_dir)),
        ("list_dir", native_fn(list_dir)),
        ("is_dir", native_fn(is_dir)),
        ("is_file", native_fn(is_file)),
        ("copy", native_fn(copy)),
        ("rename", native_fn(rename)),
    ])
}

fn path_arg(args: &[Value], idx: usize, ctx: &str) -> Result<String, EvalError> {
    Ok(bytes_to_string(expect_string(&args[idx], ctx)?))
}

fn read_file(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.read_file")?;
    let path = path_arg(args, 0, "fs.read_file")?;
    let bytes = std::fs::read(&path).map_err(|e| map_io(e, &path))?;
    Ok(Value::string(bytes))
}

fn write_file(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "fs.write_file")?;
    let path = path_arg(args, 0, "fs.write_file")?;
    let content = expect_string(&args[1], "fs.write_file")?;
    std::fs::write(&path, content).map_err(EvalError::from)?;
    Ok(Value::Nil)
}

fn append_file(args: &[Value]) -> Result<Value, EvalError> {
    use std::io::Write;
    expect_arity(args, 2, "fs.append_file")?;
    let path = path_arg(args, 0, "fs.append_file")?;
    let content = expect_string(&args[1], "fs.append_file")?;
    let mut f = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
    f.write_all(&content)?;
    Ok(Value::Nil)
}

fn exists(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.exists")?;
    Ok(Value::Bool(std::path::Path::new(&path_arg(args, 0, "fs.exists")?).exists()))
}

fn remove_file(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.remove_file")?;
    let path = path_arg(args, 0, "fs.remove_file")?;
    std::fs::remove_file(&path).map_err(|e| map_io(e, &path))?;
    Ok(Value::Nil)
}

fn create_dir(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.create_dir")?;
    let path = path_arg(args, 0, "fs.create_dir")?;
    std::fs::create_dir_all(&path).map_err(|_| EvalError::DirectoryCreationError(path))?;
    Ok(Value::Nil)
}

fn remove_dir(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.remove_dir")?;
    let path = path_arg(args, 0, "fs.remove_dir")?;
    std::fs::remove_dir_all(&path).map_err(|e| map_io(e, &path))?;
    Ok(Value::Nil)
}

fn list_dir(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.list_dir")?;
    let path = path_arg(args, 0, "fs.list_dir")?;
    let entries = std::fs::read_dir(&path).map_err(|e| map_io(e, &path))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        names.push(Value::string(entry.file_name().to_string_lossy().into_owned()));
    }
    Ok(Value::array(names))
}

fn is_dir(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.is_dir")?;
    Ok(Value::Bool(std::path::Path::new(&path_arg(args, 0, "fs.is_dir")?).is_dir()))
}

fn is_file(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "fs.is_file")?;
    Ok(Value::Bool(std::path::Path::new(&path_arg(args, 0, "fs.is_file")?).is_file()))
}

fn copy(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "fs.copy")?;
    let src = path_arg(args, 0, "fs.copy")?;
    let dst = path_arg(args, 1, "fs.copy")?;
    std::fs::copy(&src, &dst).map_err(|e| map_io(e, &src))?;
    Ok(Value::Nil)
}

fn rename(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "fs.rename")?;
    let src = path_arg(args, 0, "fs.rename")?;
    let dst = path_arg(args, 1, "fs.rename")?;
    std::fs::rename(&src, &dst).map_err(|e| map_io(e, &src))?;
    Ok(Value::Nil)
}

fn map_io(e: std::io::Error, path: &str) -> EvalError {
    if e.kind() == std::io::ErrorKind::NotFound {
        EvalError::FileNotFound(path.to_string())
    } else {
        EvalError::IoFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.txt");
        let path = Value::string(file.to_string_lossy().into_owned());
        write_file(&[path.clone(), Value::string("hello")]).unwrap();
        let content = read_file(&[path]).unwrap();
        assert_eq!(content, Value::string("hello"));
    }

    #[test]
    fn read_missing_file_fails_not_found() {
        let path = Value::string("/nonexistent/path/zzz.txt");
        assert!(matches!(read_file(&[path]), Err(EvalError::FileNotFound(_))));
    }
}
