//! `stack`: LIFO (spec.md §4.5, exercised directly by scenario 5).

use super::{downcast, make_instance};
use crate::util::expect_arity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct StackData {
    items: Mutex<Vec<Value>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "stack constructor")?;
            let ty = ty.upgrade().expect("stack type registered");
            Ok(make_instance(ty, StackData { items: Mutex::new(Vec::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("push".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "stack.push")?;
            downcast::<StackData>(recv, "stack")?.items.lock().unwrap().push(args[0].clone());
            Ok(Value::Nil)
        }));

        methods.insert("pop".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "stack.pop")?;
            let data = downcast::<StackData>(recv, "stack")?;
            let mut items = data.items.lock().unwrap();
            let len = items.len();
            items.pop().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "stack.pop".into() })
        }));

        methods.insert("peek".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "stack.peek")?;
            let data = downcast::<StackData>(recv, "stack")?;
            let items = data.items.lock().unwrap();
            let len = items.len();
            items.last().cloned().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "stack.peek".into() })
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "stack.size")?;
            Ok(Value::Number(downcast::<StackData>(recv, "stack")?.items.lock().unwrap().len() as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "stack.empty")?;
            Ok(Value::Bool(downcast::<StackData>(recv, "stack")?.items.lock().unwrap().is_empty()))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "stack.clear")?;
            downcast::<StackData>(recv, "stack")?.items.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "stack.items")?;
            Ok(Value::array(downcast::<StackData>(recv, "stack")?.items.lock().unwrap().clone()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "stack.str")?;
            let items = downcast::<StackData>(recv, "stack")?.items.lock().unwrap().clone();
            Ok(Value::string(zima_core::value::to_string(&Value::array(items))))
        }));

        StdStructDef { name: "stack".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exercises spec.md §8 scenario 5 directly against the native type.
    #[test]
    fn spec_scenario_push_pop_peek_size() {
        let ty = type_def();
        let s = (ty.constructor)(&[]).unwrap();
        (ty.methods["push"])(&s, &[Value::Number(1.0)]).unwrap();
        (ty.methods["push"])(&s, &[Value::Number(2.0)]).unwrap();
        (ty.methods["push"])(&s, &[Value::Number(3.0)]).unwrap();
        assert_eq!((ty.methods["pop"])(&s, &[]).unwrap(), Value::Number(3.0));
        assert_eq!((ty.methods["peek"])(&s, &[]).unwrap(), Value::Number(2.0));
        assert_eq!((ty.methods["size"])(&s, &[]).unwrap(), Value::Number(2.0));
    }
}
