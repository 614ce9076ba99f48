//! `array_list`: a contiguous, growable sequence (spec.md §4.5).
//!
//! Backed by a plain `Vec`; Rust's own amortised-doubling growth policy
//! already matches the spec's "size doubles on growth" note, so there
//! is nothing bespoke to implement here.

use super::{downcast, make_instance};
use crate::util::{expect_arity, expect_number, index_to_usize, insertion_index};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct ArrayListData {
    items: Mutex<Vec<Value>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "array_list constructor")?;
            let ty = ty.upgrade().expect("array_list type registered");
            Ok(make_instance(ty, ArrayListData { items: Mutex::new(Vec::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("push".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "array_list.push")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            data.items.lock().unwrap().push(args[0].clone());
            Ok(Value::Nil)
        }));

        methods.insert("insert".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "array_list.insert")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            let idx = expect_number(&args[0], "array_list.insert")?;
            let mut items = data.items.lock().unwrap();
            let i = insertion_index(idx, items.len(), "array_list.insert")?;
            items.insert(i, args[1].clone());
            Ok(Value::Nil)
        }));

        methods.insert("remove".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "array_list.remove")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            let idx = expect_number(&args[0], "array_list.remove")?;
            let mut items = data.items.lock().unwrap();
            let i = index_to_usize(idx, items.len(), "array_list.remove")?;
            Ok(items.remove(i))
        }));

        methods.insert("pop".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "array_list.pop")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            let mut items = data.items.lock().unwrap();
            let len = items.len();
            items.pop().ok_or_else(|| zima_core::error::EvalError::OutOfBounds {
                index: -1,
                len,
                context: "array_list.pop".to_string(),
            })
        }));

        methods.insert("get".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "array_list.get")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            let idx = expect_number(&args[0], "array_list.get")?;
            let items = data.items.lock().unwrap();
            let i = index_to_usize(idx, items.len(), "array_list.get")?;
            Ok(items[i].clone())
        }));

        methods.insert("set".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "array_list.set")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            let idx = expect_number(&args[0], "array_list.set")?;
            let mut items = data.items.lock().unwrap();
            let i = index_to_usize(idx, items.len(), "array_list.set")?;
            items[i] = args[1].clone();
            Ok(Value::Nil)
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "array_list.clear")?;
            downcast::<ArrayListData>(recv, "array_list")?.items.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "array_list.empty")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            Ok(Value::Bool(data.items.lock().unwrap().is_empty()))
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "array_list.size")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            Ok(Value::Number(data.items.lock().unwrap().len() as f64))
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "array_list.items")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            Ok(Value::array(data.items.lock().unwrap().clone()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "array_list.str")?;
            let data = downcast::<ArrayListData>(recv, "array_list")?;
            Ok(Value::string(zima_core::value::to_string(&Value::array(
                data.items.lock().unwrap().clone(),
            ))))
        }));

        StdStructDef { name: "array_list".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_and_size() {
        let ty = type_def();
        let instance = (ty.constructor)(&[]).unwrap();
        (ty.methods["push"])(&instance, &[Value::Number(1.0)]).unwrap();
        (ty.methods["push"])(&instance, &[Value::Number(2.0)]).unwrap();
        assert_eq!((ty.methods["size"])(&instance, &[]).unwrap(), Value::Number(2.0));
        assert_eq!((ty.methods["pop"])(&instance, &[]).unwrap(), Value::Number(2.0));
    }
}
