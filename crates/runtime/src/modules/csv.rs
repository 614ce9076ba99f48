//! `csv` module: rows of strings in, rows of strings out, via the
//! `csv` crate (spec.md §6 lists `csv` among the script-visible
//! builtin modules).

use super::{module, native_fn};
use crate::util::{bytes_to_string, expect_array, expect_arity, expect_string};
use zima_core::error::EvalError;
use zima_core::value::Value;

pub fn build() -> Value {
    module(vec![
        ("parse", native_fn(parse)),
        ("to_string", native_fn(to_string_fn)),
        ("read_file", native_fn(read_file)),
        ("write_file", native_fn(write_file)),
    ])
}

fn rows_to_value(rows: Vec<csv::StringRecord>) -> Value {
    Value::array(
        rows.into_iter()
            .map(|r| Value::array(r.iter().map(Value::string).collect()))
            .collect(),
    )
}

fn value_to_rows(v: &Value, ctx: &str) -> Result<Vec<Vec<String>>, EvalError> {
    let rows = expect_array(v, ctx)?;
    rows.iter()
        .map(|row| {
            expect_array(row, ctx)?
                .iter()
                .map(|cell| expect_string(cell, ctx).map(bytes_to_string))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

fn parse(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "csv.parse")?;
    let text = expect_string(&args[0], "csv.parse")?;
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(text.as_slice());
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|e| EvalError::InvalidFileFormat(e.to_string()))?);
    }
    Ok(rows_to_value(rows))
}

fn to_string_fn(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "csv.to_string")?;
    let rows = value_to_rows(&args[0], "csv.to_string")?;
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for row in &rows {
        writer.write_record(row).map_err(|e| EvalError::InvalidFileFormat(e.to_string()))?;
    }
    let bytes = writer.into_inner().map_err(|e| EvalError::IoFailure(e.to_string()))?;
    Ok(Value::string(bytes))
}

fn read_file(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "csv.read_file")?;
    let path = bytes_to_string(expect_string(&args[0], "csv.read_file")?);
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(&path).map_err(|e| map_csv_open(e, &path))?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|e| EvalError::InvalidFileFormat(e.to_string()))?);
    }
    Ok(rows_to_value(rows))
}

fn write_file(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "csv.write_file")?;
    let path = bytes_to_string(expect_string(&args[0], "csv.write_file")?);
    let rows = value_to_rows(&args[1], "csv.write_file")?;
    let mut writer = csv::WriterBuilder::new().from_path(&path).map_err(|e| map_csv_open(e, &path))?;
    for row in &rows {
        writer.write_record(row).map_err(|e| EvalError::InvalidFileFormat(e.to_string()))?;
    }
    writer.flush()?;
    Ok(Value::Nil)
}

fn map_csv_open(e: csv::Error, path: &str) -> EvalError {
    if let csv::ErrorKind::Io(io) = e.kind() {
        if io.kind() == std::io::ErrorKind::NotFound {
            return EvalError::FileNotFound(path.to_string());
        }
    }
    EvalError::IoFailure(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render_round_trip() {
        let text = Value::string("a,b\nc,d\n");
        let rows = parse(&[text]).unwrap();
        let back = to_string_fn(&[rows]).unwrap();
        assert_eq!(back, Value::string("a,b\nc,d\n"));
    }
}
