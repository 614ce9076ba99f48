//! `vector`: a 2D-4D Euclidean vector over `f64` (spec.md §4.5).
//!
//! Constructed from an array literal of 2, 3 or 4 numbers; every
//! operation that combines two vectors requires matching dimension
//! and fails with `vector_size_mismatch` otherwise.

use super::{downcast, make_instance};
use crate::util::{expect_array, expect_arity, expect_number, index_to_usize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct VectorData {
    components: Mutex<Vec<f64>>,
}

fn components_of(v: &[Value], context: &str) -> Result<Vec<f64>, EvalError> {
    let nums: Vec<f64> = v.iter().map(|x| expect_number(x, context)).collect::<Result<_, _>>()?;
    if nums.len() < 2 || nums.len() > 4 {
        return Err(EvalError::TypeMismatch {
            expected: "an array of 2 to 4 numbers".into(),
            got: format!("array of {}", nums.len()),
            context: context.to_string(),
        });
    }
    Ok(nums)
}

fn require_same_dim(a: &[f64], b: &[f64]) -> Result<(), EvalError> {
    if a.len() != b.len() {
        return Err(EvalError::VectorSizeMismatch { a: a.len(), b: b.len() });
    }
    Ok(())
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 1, "vector constructor")?;
            let items = expect_array(&args[0], "vector constructor")?;
            let components = components_of(&items, "vector constructor")?;
            let ty = ty.upgrade().expect("vector type registered");
            Ok(make_instance(ty, VectorData { components: Mutex::new(components) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("add".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.add")?;
            let a = downcast::<VectorData>(recv, "vector")?;
            let other = downcast::<VectorData>(&args[0], "vector")?;
            let a = a.components.lock().unwrap();
            let b = other.components.lock().unwrap();
            require_same_dim(&a, &b)?;
            let result: Vec<Value> = a.iter().zip(b.iter()).map(|(x, y)| Value::Number(x + y)).collect();
            Ok(Value::array(result))
        }));

        methods.insert("sub".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.sub")?;
            let a = downcast::<VectorData>(recv, "vector")?;
            let other = downcast::<VectorData>(&args[0], "vector")?;
            let a = a.components.lock().unwrap();
            let b = other.components.lock().unwrap();
            require_same_dim(&a, &b)?;
            let result: Vec<Value> = a.iter().zip(b.iter()).map(|(x, y)| Value::Number(x - y)).collect();
            Ok(Value::array(result))
        }));

        methods.insert("dot".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.dot")?;
            let a = downcast::<VectorData>(recv, "vector")?;
            let other = downcast::<VectorData>(&args[0], "vector")?;
            let a = a.components.lock().unwrap();
            let b = other.components.lock().unwrap();
            require_same_dim(&a, &b)?;
            let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
            Ok(Value::Number(dot))
        }));

        methods.insert("scale".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.scale")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            let factor = expect_number(&args[0], "vector.scale")?;
            let scaled: Vec<Value> =
                data.components.lock().unwrap().iter().map(|x| Value::Number(x * factor)).collect();
            Ok(Value::array(scaled))
        }));

        methods.insert("norm".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "vector.norm")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            let sum_sq: f64 = data.components.lock().unwrap().iter().map(|x| x * x).sum();
            Ok(Value::Number(sum_sq.sqrt()))
        }));

        methods.insert("normalize".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "vector.normalize")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            let components = data.components.lock().unwrap();
            let mag = (components.iter().map(|x| x * x).sum::<f64>()).sqrt();
            if mag == 0.0 {
                return Err(EvalError::DivisionByZero("vector.normalize".into()));
            }
            let result: Vec<Value> = components.iter().map(|x| Value::Number(x / mag)).collect();
            Ok(Value::array(result))
        }));

        methods.insert("dim".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "vector.dim")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            Ok(Value::Number(data.components.lock().unwrap().len() as f64))
        }));

        methods.insert("project".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.project")?;
            let a = downcast::<VectorData>(recv, "vector")?;
            let other = downcast::<VectorData>(&args[0], "vector")?;
            let a = a.components.lock().unwrap();
            let b = other.components.lock().unwrap();
            require_same_dim(&a, &b)?;
            let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
            let b_sq: f64 = b.iter().map(|x| x * x).sum();
            if b_sq == 0.0 {
                return Err(EvalError::DivisionByZero("vector.project".into()));
            }
            let factor = dot / b_sq;
            let result: Vec<Value> = b.iter().map(|x| Value::Number(x * factor)).collect();
            Ok(Value::array(result))
        }));

        methods.insert("angle".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.angle")?;
            let a = downcast::<VectorData>(recv, "vector")?;
            let other = downcast::<VectorData>(&args[0], "vector")?;
            let a = a.components.lock().unwrap();
            let b = other.components.lock().unwrap();
            require_same_dim(&a, &b)?;
            let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
            let mag_a = (a.iter().map(|x| x * x).sum::<f64>()).sqrt();
            let mag_b = (b.iter().map(|x| x * x).sum::<f64>()).sqrt();
            if mag_a == 0.0 || mag_b == 0.0 {
                return Err(EvalError::DivisionByZero("vector.angle".into()));
            }
            let cos = (dot / (mag_a * mag_b)).clamp(-1.0, 1.0);
            Ok(Value::Number(cos.acos()))
        }));

        methods.insert("cross".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.cross")?;
            let a = downcast::<VectorData>(recv, "vector")?;
            let other = downcast::<VectorData>(&args[0], "vector")?;
            let a = a.components.lock().unwrap();
            let b = other.components.lock().unwrap();
            if a.len() != 3 || b.len() != 3 {
                return Err(EvalError::TypeMismatch {
                    expected: "two 3-dimensional vectors".into(),
                    got: format!("{} and {} dimensions", a.len(), b.len()),
                    context: "vector.cross".into(),
                });
            }
            let result = vec![
                Value::Number(a[1] * b[2] - a[2] * b[1]),
                Value::Number(a[2] * b[0] - a[0] * b[2]),
                Value::Number(a[0] * b[1] - a[1] * b[0]),
            ];
            Ok(Value::array(result))
        }));

        methods.insert("equals".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.equals")?;
            let a = downcast::<VectorData>(recv, "vector")?;
            let other = downcast::<VectorData>(&args[0], "vector")?;
            let a = a.components.lock().unwrap();
            let b = other.components.lock().unwrap();
            Ok(Value::Bool(a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)))
        }));

        methods.insert("get".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "vector.get")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            let idx = expect_number(&args[0], "vector.get")?;
            let components = data.components.lock().unwrap();
            let i = index_to_usize(idx, components.len(), "vector.get")?;
            Ok(Value::Number(components[i]))
        }));

        methods.insert("set".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "vector.set")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            let idx = expect_number(&args[0], "vector.set")?;
            let val = expect_number(&args[1], "vector.set")?;
            let mut components = data.components.lock().unwrap();
            let i = index_to_usize(idx, components.len(), "vector.set")?;
            components[i] = val;
            Ok(Value::Nil)
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "vector.items")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            Ok(Value::array(data.components.lock().unwrap().iter().map(|x| Value::Number(*x)).collect()))
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "vector.size")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            Ok(Value::Number(data.components.lock().unwrap().len() as f64))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "vector.str")?;
            let data = downcast::<VectorData>(recv, "vector")?;
            let items: Vec<Value> = data.components.lock().unwrap().iter().map(|x| Value::Number(*x)).collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(items))))
        }));

        StdStructDef { name: "vector".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(ty: &Arc<StdStructDef>, xs: &[f64]) -> Value {
        let arr = Value::array(xs.iter().map(|x| Value::Number(*x)).collect());
        (ty.constructor)(&[arr]).unwrap()
    }

    #[test]
    fn dot_and_norm() {
        let ty = type_def();
        let a = make(&ty, &[3.0, 4.0]);
        assert_eq!((ty.methods["norm"])(&a, &[]).unwrap(), Value::Number(5.0));
        let b = make(&ty, &[1.0, 0.0]);
        assert_eq!((ty.methods["dot"])(&a, &[b]).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn cross_product_of_unit_axes() {
        let ty = type_def();
        let x = make(&ty, &[1.0, 0.0, 0.0]);
        let y = make(&ty, &[0.0, 1.0, 0.0]);
        let z = (ty.methods["cross"])(&x, &[y]).unwrap();
        assert_eq!(z, Value::array(vec![Value::Number(0.0), Value::Number(0.0), Value::Number(1.0)]));
    }

    #[test]
    fn mismatched_dimensions_fail() {
        let ty = type_def();
        let a = make(&ty, &[1.0, 2.0]);
        let b = make(&ty, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            (ty.methods["add"])(&a, &[b]),
            Err(EvalError::VectorSizeMismatch { a: 2, b: 3 })
        ));
    }
}
