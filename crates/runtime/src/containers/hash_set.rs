//! `set` (spec.md's `hash_set`): unique `Value`s by structural equality.
//! The constructor may take a seed array (spec.md §4.5).

use super::{downcast, make_instance};
use crate::util::expect_array;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value, equal};

pub struct SetData {
    items: Mutex<Vec<Value>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            let ty = ty.upgrade().expect("set type registered");
            let seed = match args {
                [] => Vec::new(),
                [seed] => expect_array(seed, "set constructor")?,
                _ => {
                    return Err(zima_core::error::EvalError::ArityMismatch {
                        expected: 1,
                        got: args.len(),
                        context: "set constructor".to_string(),
                    });
                }
            };
            let mut items: Vec<Value> = Vec::new();
            for v in seed {
                if !items.iter().any(|e| equal(e, &v)) {
                    items.push(v);
                }
            }
            Ok(make_instance(ty, SetData { items: Mutex::new(items) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("insert".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 1, "set.insert")?;
            let data = downcast::<SetData>(recv, "set")?;
            let mut items = data.items.lock().unwrap();
            if !items.iter().any(|e| equal(e, &args[0])) {
                items.push(args[0].clone());
            }
            Ok(Value::Nil)
        }));

        methods.insert("remove".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 1, "set.remove")?;
            let data = downcast::<SetData>(recv, "set")?;
            let mut items = data.items.lock().unwrap();
            if let Some(pos) = items.iter().position(|e| equal(e, &args[0])) {
                items.remove(pos);
            }
            Ok(Value::Nil)
        }));

        methods.insert("contains".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 1, "set.contains")?;
            let data = downcast::<SetData>(recv, "set")?;
            Ok(Value::Bool(data.items.lock().unwrap().iter().any(|e| equal(e, &args[0]))))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 0, "set.clear")?;
            downcast::<SetData>(recv, "set")?.items.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 0, "set.size")?;
            Ok(Value::Number(downcast::<SetData>(recv, "set")?.items.lock().unwrap().len() as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 0, "set.empty")?;
            Ok(Value::Bool(downcast::<SetData>(recv, "set")?.items.lock().unwrap().is_empty()))
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 0, "set.items")?;
            Ok(Value::array(downcast::<SetData>(recv, "set")?.items.lock().unwrap().clone()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            crate::util::expect_arity(args, 0, "set.str")?;
            let items = downcast::<SetData>(recv, "set")?.items.lock().unwrap().clone();
            Ok(Value::string(zima_core::value::to_string(&Value::array(items))))
        }));

        StdStructDef { name: "set".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_deduplicates() {
        let ty = type_def();
        let s = (ty.constructor)(&[]).unwrap();
        (ty.methods["insert"])(&s, &[Value::Number(1.0)]).unwrap();
        (ty.methods["insert"])(&s, &[Value::Number(1.0)]).unwrap();
        assert_eq!((ty.methods["size"])(&s, &[]).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn seed_array_deduplicates_on_construction() {
        let ty = type_def();
        let seed = Value::array(vec![Value::Number(1.0), Value::Number(1.0), Value::Number(2.0)]);
        let s = (ty.constructor)(&[seed]).unwrap();
        assert_eq!((ty.methods["size"])(&s, &[]).unwrap(), Value::Number(2.0));
    }
}
