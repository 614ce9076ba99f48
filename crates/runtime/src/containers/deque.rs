//! `deque`: double-ended queue (spec.md §4.5).

use super::{downcast, make_instance};
use crate::util::expect_arity;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct DequeData {
    items: Mutex<VecDeque<Value>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "deque constructor")?;
            let ty = ty.upgrade().expect("deque type registered");
            Ok(make_instance(ty, DequeData { items: Mutex::new(VecDeque::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("push_head".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "deque.push_head")?;
            downcast::<DequeData>(recv, "deque")?.items.lock().unwrap().push_front(args[0].clone());
            Ok(Value::Nil)
        }));

        methods.insert("push_tail".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "deque.push_tail")?;
            downcast::<DequeData>(recv, "deque")?.items.lock().unwrap().push_back(args[0].clone());
            Ok(Value::Nil)
        }));

        methods.insert("pop_head".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.pop_head")?;
            let data = downcast::<DequeData>(recv, "deque")?;
            let mut items = data.items.lock().unwrap();
            let len = items.len();
            items.pop_front().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "deque.pop_head".into() })
        }));

        methods.insert("pop_tail".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.pop_tail")?;
            let data = downcast::<DequeData>(recv, "deque")?;
            let mut items = data.items.lock().unwrap();
            let len = items.len();
            items.pop_back().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "deque.pop_tail".into() })
        }));

        methods.insert("peek_head".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.peek_head")?;
            let data = downcast::<DequeData>(recv, "deque")?;
            let items = data.items.lock().unwrap();
            let len = items.len();
            items.front().cloned().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "deque.peek_head".into() })
        }));

        methods.insert("peek_tail".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.peek_tail")?;
            let data = downcast::<DequeData>(recv, "deque")?;
            let items = data.items.lock().unwrap();
            let len = items.len();
            items.back().cloned().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "deque.peek_tail".into() })
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.size")?;
            Ok(Value::Number(downcast::<DequeData>(recv, "deque")?.items.lock().unwrap().len() as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.empty")?;
            Ok(Value::Bool(downcast::<DequeData>(recv, "deque")?.items.lock().unwrap().is_empty()))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.clear")?;
            downcast::<DequeData>(recv, "deque")?.items.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.items")?;
            Ok(Value::array(downcast::<DequeData>(recv, "deque")?.items.lock().unwrap().iter().cloned().collect()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "deque.str")?;
            let items: Vec<Value> = downcast::<DequeData>(recv, "deque")?.items.lock().unwrap().iter().cloned().collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(items))))
        }));

        StdStructDef { name: "deque".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_both_ends_and_pop() {
        let ty = type_def();
        let d = (ty.constructor)(&[]).unwrap();
        (ty.methods["push_tail"])(&d, &[Value::Number(1.0)]).unwrap();
        (ty.methods["push_head"])(&d, &[Value::Number(0.0)]).unwrap();
        assert_eq!((ty.methods["pop_head"])(&d, &[]).unwrap(), Value::Number(0.0));
        assert_eq!((ty.methods["pop_tail"])(&d, &[]).unwrap(), Value::Number(1.0));
    }
}
