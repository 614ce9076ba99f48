//! `matrix`: a square row-major matrix over `f64`, dimension 2..4
//! (spec.md §4.5).
//!
//! The constructor is polymorphic in argument shape: a single integer
//! builds an identity matrix of that dimension; a single nested array
//! of row arrays builds from that layout directly; 2 to 4 plain-number
//! row arrays passed as separate arguments build one row each.

use super::{downcast, make_instance};
use crate::util::{expect_array, expect_arity, expect_number};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct MatrixData {
    rows: Mutex<Vec<Vec<f64>>>,
}

fn identity(dim: usize) -> Vec<Vec<f64>> {
    (0..dim)
        .map(|i| (0..dim).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn row_from_value(v: &Value, context: &str) -> Result<Vec<f64>, EvalError> {
    let items = expect_array(v, context)?;
    items.iter().map(|x| expect_number(x, context)).collect()
}

fn validate_square(rows: Vec<Vec<f64>>, context: &str) -> Result<Vec<Vec<f64>>, EvalError> {
    let dim = rows.len();
    if !(2..=4).contains(&dim) || rows.iter().any(|r| r.len() != dim) {
        return Err(EvalError::TypeMismatch {
            expected: "a square matrix of dimension 2 to 4".into(),
            got: format!("{} row(s)", dim),
            context: context.to_string(),
        });
    }
    Ok(rows)
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            let context = "matrix constructor";
            let rows = match args {
                [single] => match single.deref() {
                    Value::Number(n) => {
                        let dim = n.floor() as i64;
                        if !(2..=4).contains(&dim) {
                            return Err(EvalError::TypeMismatch {
                                expected: "a dimension between 2 and 4".into(),
                                got: dim.to_string(),
                                context: context.to_string(),
                            });
                        }
                        identity(dim as usize)
                    }
                    Value::Array(_) => {
                        let nested = expect_array(single, context)?;
                        validate_square(
                            nested.iter().map(|row| row_from_value(row, context)).collect::<Result<_, _>>()?,
                            context,
                        )?
                    }
                    other => {
                        return Err(EvalError::TypeMismatch {
                            expected: "a dimension or a nested array".into(),
                            got: other.type_name().into(),
                            context: context.to_string(),
                        });
                    }
                },
                rows if (2..=4).contains(&rows.len()) => validate_square(
                    rows.iter().map(|row| row_from_value(row, context)).collect::<Result<_, _>>()?,
                    context,
                )?,
                other => {
                    return Err(EvalError::ArityMismatch {
                        expected: 2,
                        got: other.len(),
                        context: context.to_string(),
                    });
                }
            };
            let ty = ty.upgrade().expect("matrix type registered");
            Ok(make_instance(ty, MatrixData { rows: Mutex::new(rows) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("dim".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "matrix.dim")?;
            let data = downcast::<MatrixData>(recv, "matrix")?;
            Ok(Value::Number(data.rows.lock().unwrap().len() as f64))
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "matrix.size")?;
            let data = downcast::<MatrixData>(recv, "matrix")?;
            Ok(Value::Number(data.rows.lock().unwrap().len() as f64))
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "matrix.items")?;
            let data = downcast::<MatrixData>(recv, "matrix")?;
            let rows = data.rows.lock().unwrap();
            let rendered: Vec<Value> = rows
                .iter()
                .map(|row| Value::array(row.iter().map(|x| Value::Number(*x)).collect()))
                .collect();
            Ok(Value::array(rendered))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "matrix.str")?;
            let data = downcast::<MatrixData>(recv, "matrix")?;
            let rows = data.rows.lock().unwrap();
            let rendered: Vec<Value> = rows
                .iter()
                .map(|row| Value::array(row.iter().map(|x| Value::Number(*x)).collect()))
                .collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(rendered))))
        }));

        StdStructDef { name: "matrix".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_from_integer() {
        let ty = type_def();
        let m = (ty.constructor)(&[Value::Number(3.0)]).unwrap();
        assert_eq!((ty.methods["dim"])(&m, &[]).unwrap(), Value::Number(3.0));
        let items = (ty.methods["items"])(&m, &[]).unwrap();
        assert_eq!(
            items,
            Value::array(vec![
                Value::array(vec![Value::Number(1.0), Value::Number(0.0), Value::Number(0.0)]),
                Value::array(vec![Value::Number(0.0), Value::Number(1.0), Value::Number(0.0)]),
                Value::array(vec![Value::Number(0.0), Value::Number(0.0), Value::Number(1.0)]),
            ])
        );
    }

    #[test]
    fn built_from_row_arguments() {
        let ty = type_def();
        let row1 = Value::array(vec![Value::Number(1.0), Value::Number(2.0)]);
        let row2 = Value::array(vec![Value::Number(3.0), Value::Number(4.0)]);
        let m = (ty.constructor)(&[row1, row2]).unwrap();
        assert_eq!((ty.methods["dim"])(&m, &[]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn non_square_nested_array_rejected() {
        let ty = type_def();
        let bad = Value::array(vec![
            Value::array(vec![Value::Number(1.0), Value::Number(2.0)]),
            Value::array(vec![Value::Number(3.0)]),
        ]);
        assert!((ty.constructor)(&[bad]).is_err());
    }
}
