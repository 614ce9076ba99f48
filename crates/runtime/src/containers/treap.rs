//! `treap`: a randomised balanced BST, ordered by `less(key, key)` and
//! heap-ordered by an independently drawn random priority (spec.md
//! §4.5). Single-`Value` keys; priorities come from the `random`
//! module's own RNG source family (the `rand` crate), matching the
//! spec's note that heap/treap tie-break priorities share a source.

use super::{downcast, make_instance};
use crate::util::expect_arity;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value, equal, less};

struct Node {
    key: Value,
    priority: f64,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let mut left = node.left.take().expect("rotate_right requires a left child");
    node.left = left.right.take();
    left.right = Some(node);
    left
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let mut right = node.right.take().expect("rotate_left requires a right child");
    node.right = right.left.take();
    right.left = Some(node);
    right
}

fn insert(node: Option<Box<Node>>, key: Value, priority: f64) -> Option<Box<Node>> {
    let Some(mut n) = node else {
        return Some(Box::new(Node { key, priority, left: None, right: None }));
    };
    if equal(&key, &n.key) {
        return Some(n);
    }
    if less(&key, &n.key) {
        n.left = insert(n.left.take(), key, priority);
        if n.left.as_ref().unwrap().priority > n.priority {
            n = rotate_right(n);
        }
    } else {
        n.right = insert(n.right.take(), key, priority);
        if n.right.as_ref().unwrap().priority > n.priority {
            n = rotate_left(n);
        }
    }
    Some(n)
}

fn remove(node: Option<Box<Node>>, key: &Value) -> Option<Box<Node>> {
    let mut n = node?;
    if equal(key, &n.key) {
        match (n.left.take(), n.right.take()) {
            (None, None) => None,
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (Some(l), Some(r)) => {
                if l.priority > r.priority {
                    let mut rotated = rotate_right(Box::new(Node { key: n.key, priority: n.priority, left: Some(l), right: Some(r) }));
                    rotated.right = remove(rotated.right.take(), key);
                    Some(rotated)
                } else {
                    let mut rotated = rotate_left(Box::new(Node { key: n.key, priority: n.priority, left: Some(l), right: Some(r) }));
                    rotated.left = remove(rotated.left.take(), key);
                    Some(rotated)
                }
            }
        }
    } else if less(key, &n.key) {
        n.left = remove(n.left.take(), key);
        Some(n)
    } else {
        n.right = remove(n.right.take(), key);
        Some(n)
    }
}

fn contains(node: &Option<Box<Node>>, key: &Value) -> bool {
    match node {
        None => false,
        Some(n) if equal(key, &n.key) => true,
        Some(n) if less(key, &n.key) => contains(&n.left, key),
        Some(n) => contains(&n.right, key),
    }
}

fn height(node: &Option<Box<Node>>) -> i64 {
    match node {
        None => 0,
        Some(n) => 1 + height(&n.left).max(height(&n.right)),
    }
}

fn min_node(node: &Option<Box<Node>>) -> Option<&Value> {
    match node {
        None => None,
        Some(n) if n.left.is_none() => Some(&n.key),
        Some(n) => min_node(&n.left),
    }
}

fn max_node(node: &Option<Box<Node>>) -> Option<&Value> {
    match node {
        None => None,
        Some(n) if n.right.is_none() => Some(&n.key),
        Some(n) => max_node(&n.right),
    }
}

fn preorder(node: &Option<Box<Node>>, out: &mut Vec<Value>) {
    if let Some(n) = node {
        out.push(n.key.clone());
        preorder(&n.left, out);
        preorder(&n.right, out);
    }
}

fn size(node: &Option<Box<Node>>) -> usize {
    match node {
        None => 0,
        Some(n) => 1 + size(&n.left) + size(&n.right),
    }
}

pub struct TreapData {
    root: Mutex<Option<Box<Node>>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "treap constructor")?;
            let ty = ty.upgrade().expect("treap type registered");
            Ok(make_instance(ty, TreapData { root: Mutex::new(None) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("insert".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "treap.insert")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            let priority: f64 = rand::thread_rng().r#gen();
            let mut root = data.root.lock().unwrap();
            *root = insert(root.take(), args[0].clone(), priority);
            Ok(Value::Nil)
        }));

        methods.insert("contains".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "treap.contains")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            Ok(Value::Bool(contains(&data.root.lock().unwrap(), &args[0])))
        }));

        methods.insert("remove".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "treap.remove")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            let mut root = data.root.lock().unwrap();
            *root = remove(root.take(), &args[0]);
            Ok(Value::Nil)
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.size")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            Ok(Value::Number(size(&data.root.lock().unwrap()) as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.empty")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            Ok(Value::Bool(data.root.lock().unwrap().is_none()))
        }));

        methods.insert("height".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.height")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            Ok(Value::Number(height(&data.root.lock().unwrap()) as f64))
        }));

        methods.insert("min".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.min")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            Ok(min_node(&data.root.lock().unwrap()).cloned().unwrap_or(Value::Nil))
        }));

        methods.insert("max".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.max")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            Ok(max_node(&data.root.lock().unwrap()).cloned().unwrap_or(Value::Nil))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.clear")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            *data.root.lock().unwrap() = None;
            Ok(Value::Nil)
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.items")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            let mut out = Vec::new();
            preorder(&data.root.lock().unwrap(), &mut out);
            Ok(Value::array(out))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "treap.str")?;
            let data = downcast::<TreapData>(recv, "treap")?;
            let mut out = Vec::new();
            preorder(&data.root.lock().unwrap(), &mut out);
            Ok(Value::string(zima_core::value::to_string(&Value::array(out))))
        }));

        StdStructDef { name: "treap".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains_and_min_max() {
        let ty = type_def();
        let t = (ty.constructor)(&[]).unwrap();
        for n in [5.0, 1.0, 9.0, 3.0] {
            (ty.methods["insert"])(&t, &[Value::Number(n)]).unwrap();
        }
        assert_eq!((ty.methods["size"])(&t, &[]).unwrap(), Value::Number(4.0));
        assert_eq!((ty.methods["min"])(&t, &[]).unwrap(), Value::Number(1.0));
        assert_eq!((ty.methods["max"])(&t, &[]).unwrap(), Value::Number(9.0));
        assert!(matches!((ty.methods["contains"])(&t, &[Value::Number(3.0)]).unwrap(), Value::Bool(true)));
        (ty.methods["remove"])(&t, &[Value::Number(3.0)]).unwrap();
        assert!(matches!((ty.methods["contains"])(&t, &[Value::Number(3.0)]).unwrap(), Value::Bool(false)));
    }
}
