//! `queue`: FIFO with both `push`/`poll` and `enqueue`/`dequeue` aliases
//! (spec.md §4.5).

use super::{downcast, make_instance};
use crate::util::expect_arity;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct QueueData {
    items: Mutex<VecDeque<Value>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "queue constructor")?;
            let ty = ty.upgrade().expect("queue type registered");
            Ok(make_instance(ty, QueueData { items: Mutex::new(VecDeque::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        let push: NativeMethod = Arc::new(|recv, args| {
            expect_arity(args, 1, "queue.push")?;
            downcast::<QueueData>(recv, "queue")?.items.lock().unwrap().push_back(args[0].clone());
            Ok(Value::Nil)
        });
        methods.insert("push".to_string(), push.clone());
        methods.insert("enqueue".to_string(), push);

        let poll: NativeMethod = Arc::new(|recv, args| {
            expect_arity(args, 0, "queue.poll")?;
            let data = downcast::<QueueData>(recv, "queue")?;
            let mut items = data.items.lock().unwrap();
            let len = items.len();
            items.pop_front().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "queue.poll".into() })
        });
        methods.insert("poll".to_string(), poll.clone());
        methods.insert("dequeue".to_string(), poll);

        methods.insert("peek".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "queue.peek")?;
            let data = downcast::<QueueData>(recv, "queue")?;
            let items = data.items.lock().unwrap();
            let len = items.len();
            items.front().cloned().ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "queue.peek".into() })
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "queue.size")?;
            Ok(Value::Number(downcast::<QueueData>(recv, "queue")?.items.lock().unwrap().len() as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "queue.empty")?;
            Ok(Value::Bool(downcast::<QueueData>(recv, "queue")?.items.lock().unwrap().is_empty()))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "queue.clear")?;
            downcast::<QueueData>(recv, "queue")?.items.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "queue.items")?;
            Ok(Value::array(downcast::<QueueData>(recv, "queue")?.items.lock().unwrap().iter().cloned().collect()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "queue.str")?;
            let items: Vec<Value> = downcast::<QueueData>(recv, "queue")?.items.lock().unwrap().iter().cloned().collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(items))))
        }));

        StdStructDef { name: "queue".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_and_aliases() {
        let ty = type_def();
        let q = (ty.constructor)(&[]).unwrap();
        (ty.methods["enqueue"])(&q, &[Value::Number(1.0)]).unwrap();
        (ty.methods["push"])(&q, &[Value::Number(2.0)]).unwrap();
        assert_eq!((ty.methods["dequeue"])(&q, &[]).unwrap(), Value::Number(1.0));
        assert_eq!((ty.methods["poll"])(&q, &[]).unwrap(), Value::Number(2.0));
    }
}
