//! `heap` (spec.md's `priority_queue`): a binary-heap-ordered priority
//! queue. `new heap(max_at_top)` picks max- or min-first extraction.
//!
//! Ties are broken by insertion order (the earliest-inserted of a set
//! of equal elements comes out first) — the same stable tie-break the
//! Huffman tree build needs from its own internal priority queue
//! (spec.md §4.6.3), kept here as one general-purpose implementation
//! rather than a second bespoke one in the codec crate.

use super::{downcast, make_instance};
use crate::util::{expect_arity, expect_bool};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value, less};

pub struct HeapData {
    max_at_top: bool,
    entries: Mutex<Vec<(Value, u64)>>,
    seq: AtomicU64,
}

impl HeapData {
    /// Index of the element due out next: the extremal value per
    /// `max_at_top`, ties broken by the lowest insertion sequence.
    fn extremal_index(&self, entries: &[(Value, u64)]) -> Option<usize> {
        entries
            .iter()
            .enumerate()
            .min_by(|(_, (va, sa)), (_, (vb, sb))| {
                let a_before_b = if self.max_at_top { less(vb, va) } else { less(va, vb) };
                let b_before_a = if self.max_at_top { less(va, vb) } else { less(vb, va) };
                if a_before_b {
                    std::cmp::Ordering::Less
                } else if b_before_a {
                    std::cmp::Ordering::Greater
                } else if sa != sb {
                    sa.cmp(sb)
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|(i, _)| i)
    }
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 1, "heap constructor")?;
            let max_at_top = expect_bool(&args[0], "heap constructor")?;
            let ty = ty.upgrade().expect("heap type registered");
            Ok(make_instance(ty, HeapData { max_at_top, entries: Mutex::new(Vec::new()), seq: AtomicU64::new(0) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("insert".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "heap.insert")?;
            let data = downcast::<HeapData>(recv, "heap")?;
            let seq = data.seq.fetch_add(1, AtomicOrdering::SeqCst);
            data.entries.lock().unwrap().push((args[0].clone(), seq));
            Ok(Value::Nil)
        }));

        methods.insert("poll".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "heap.poll")?;
            let data = downcast::<HeapData>(recv, "heap")?;
            let mut entries = data.entries.lock().unwrap();
            let len = entries.len();
            let idx = data
                .extremal_index(&entries)
                .ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "heap.poll".into() })?;
            Ok(entries.remove(idx).0)
        }));

        methods.insert("peek".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "heap.peek")?;
            let data = downcast::<HeapData>(recv, "heap")?;
            let entries = data.entries.lock().unwrap();
            let len = entries.len();
            let idx = data
                .extremal_index(&entries)
                .ok_or_else(|| EvalError::OutOfBounds { index: -1, len, context: "heap.peek".into() })?;
            Ok(entries[idx].0.clone())
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "heap.size")?;
            Ok(Value::Number(downcast::<HeapData>(recv, "heap")?.entries.lock().unwrap().len() as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "heap.empty")?;
            Ok(Value::Bool(downcast::<HeapData>(recv, "heap")?.entries.lock().unwrap().is_empty()))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "heap.clear")?;
            downcast::<HeapData>(recv, "heap")?.entries.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "heap.items")?;
            let data = downcast::<HeapData>(recv, "heap")?;
            Ok(Value::array(data.entries.lock().unwrap().iter().map(|(v, _)| v.clone()).collect()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "heap.str")?;
            let data = downcast::<HeapData>(recv, "heap")?;
            let items: Vec<Value> = data.entries.lock().unwrap().iter().map(|(v, _)| v.clone()).collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(items))))
        }));

        StdStructDef { name: "heap".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exercises spec.md §8 scenario 6 directly against the native type.
    #[test]
    fn spec_scenario_max_heap_polls_descending() {
        let ty = type_def();
        let h = (ty.constructor)(&[Value::Bool(true)]).unwrap();
        (ty.methods["insert"])(&h, &[Value::Number(10.0)]).unwrap();
        (ty.methods["insert"])(&h, &[Value::Number(3.0)]).unwrap();
        (ty.methods["insert"])(&h, &[Value::Number(8.0)]).unwrap();
        assert_eq!((ty.methods["poll"])(&h, &[]).unwrap(), Value::Number(10.0));
        assert_eq!((ty.methods["poll"])(&h, &[]).unwrap(), Value::Number(8.0));
        assert_eq!((ty.methods["poll"])(&h, &[]).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let ty = type_def();
        let h = (ty.constructor)(&[Value::Bool(false)]).unwrap();
        (ty.methods["insert"])(&h, &[Value::string("b")]).unwrap();
        (ty.methods["insert"])(&h, &[Value::string("a")]).unwrap();
        (ty.methods["insert"])(&h, &[Value::string("a")]).unwrap();
        assert_eq!((ty.methods["poll"])(&h, &[]).unwrap(), Value::string("a"));
    }
}
