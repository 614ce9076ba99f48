//! `linked_list`: a doubly linked list (spec.md §4.5).
//!
//! `std::collections::VecDeque` gives O(1) head/tail operations; plain
//! `get`/`remove`/`discard` fall back to a linear walk, same cost as an
//! actual doubly linked list would pay for indexed access.

use super::{downcast, make_instance};
use crate::util::{expect_arity, expect_number, index_to_usize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct LinkedListData {
    items: Mutex<VecDeque<Value>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "linked_list constructor")?;
            let ty = ty.upgrade().expect("linked_list type registered");
            Ok(make_instance(ty, LinkedListData { items: Mutex::new(VecDeque::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("append".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "linked_list.append")?;
            downcast::<LinkedListData>(recv, "linked_list")?.items.lock().unwrap().push_back(args[0].clone());
            Ok(Value::Nil)
        }));

        methods.insert("prepend".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "linked_list.prepend")?;
            downcast::<LinkedListData>(recv, "linked_list")?.items.lock().unwrap().push_front(args[0].clone());
            Ok(Value::Nil)
        }));

        methods.insert("pop_head".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.pop_head")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let mut items = data.items.lock().unwrap();
            let len = items.len();
            items.pop_front().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "linked_list.pop_head".into() })
        }));

        methods.insert("pop_tail".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.pop_tail")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let mut items = data.items.lock().unwrap();
            let len = items.len();
            items.pop_back().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "linked_list.pop_tail".into() })
        }));

        methods.insert("get".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "linked_list.get")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let idx = expect_number(&args[0], "linked_list.get")?;
            let items = data.items.lock().unwrap();
            let i = index_to_usize(idx, items.len(), "linked_list.get")?;
            Ok(items[i].clone())
        }));

        methods.insert("remove".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "linked_list.remove")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let idx = expect_number(&args[0], "linked_list.remove")?;
            let mut items = data.items.lock().unwrap();
            let i = index_to_usize(idx, items.len(), "linked_list.remove")?;
            Ok(items.remove(i).unwrap())
        }));

        methods.insert("discard".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "linked_list.discard")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let idx = expect_number(&args[0], "linked_list.discard")?;
            let mut items = data.items.lock().unwrap();
            let i = index_to_usize(idx, items.len(), "linked_list.discard")?;
            items.remove(i);
            Ok(Value::Nil)
        }));

        methods.insert("peek_head".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.peek_head")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let items = data.items.lock().unwrap();
            let len = items.len();
            items.front().cloned().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "linked_list.peek_head".into() })
        }));

        methods.insert("peek_tail".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.peek_tail")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let items = data.items.lock().unwrap();
            let len = items.len();
            items.back().cloned().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "linked_list.peek_tail".into() })
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.clear")?;
            downcast::<LinkedListData>(recv, "linked_list")?.items.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.empty")?;
            Ok(Value::Bool(downcast::<LinkedListData>(recv, "linked_list")?.items.lock().unwrap().is_empty()))
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.size")?;
            Ok(Value::Number(downcast::<LinkedListData>(recv, "linked_list")?.items.lock().unwrap().len() as f64))
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.items")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            Ok(Value::array(data.items.lock().unwrap().iter().cloned().collect()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "linked_list.str")?;
            let data = downcast::<LinkedListData>(recv, "linked_list")?;
            let items: Vec<Value> = data.items.lock().unwrap().iter().cloned().collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(items))))
        }));

        StdStructDef { name: "linked_list".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_prepend_and_peek() {
        let ty = type_def();
        let instance = (ty.constructor)(&[]).unwrap();
        (ty.methods["append"])(&instance, &[Value::Number(1.0)]).unwrap();
        (ty.methods["prepend"])(&instance, &[Value::Number(0.0)]).unwrap();
        assert_eq!((ty.methods["peek_head"])(&instance, &[]).unwrap(), Value::Number(0.0));
        assert_eq!((ty.methods["peek_tail"])(&instance, &[]).unwrap(), Value::Number(1.0));
    }
}
