//! Container library (C5, spec.md §4.5): every native container exposed
//! to scripts via `new T(args)` as an `std_struct`.
//!
//! Grounded on `seq-runtime`'s module-per-domain layout (`list_ops.rs`,
//! `string_ops.rs`, ...), but each module here builds one self-contained
//! `Arc<StdStructDef>` rather than a set of `extern "C"` stack-effect
//! functions, since there is no LLVM-compiled caller on this side.

pub mod adjacency_list;
pub mod adjacency_matrix;
pub mod array_list;
pub mod deque;
pub mod graph;
pub mod hash_map;
pub mod hash_set;
pub mod heap;
pub mod linked_list;
pub mod matrix;
pub mod queue;
pub mod stack;
pub mod treap;
pub mod vector;

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use zima_core::error::EvalError;
use zima_core::value::{NativeMethod, OrderedFieldMap, StdInstanceData, StdStructDef, TypedValData, Value, new_cell};

/// Build a fresh `std_instance` of `ty` wrapping `payload` behind a
/// `typed_val` tagged with `ty`'s own name (spec.md §3.1 invariant).
pub fn make_instance<T: Send + Sync + 'static>(ty: Arc<StdStructDef>, payload: T) -> Value {
    let typed = Value::TypedVal(Arc::new(TypedValData {
        type_tag: ty.name.clone(),
        payload: Arc::new(payload),
    }));
    let mut fields = OrderedFieldMap::new();
    fields.insert("__internal".to_string(), new_cell(typed));
    Value::StdInstance(Arc::new(StdInstanceData { ty, fields: Mutex::new(fields) }))
}

/// Recover the native payload of type `T` from a `this` receiver,
/// failing with `malformed_instance`/`missing_internal_field` per
/// spec.md §4.1's documented failure modes.
pub fn downcast<T: Send + Sync + 'static>(receiver: &Value, type_name: &str) -> Result<Arc<T>, EvalError> {
    let Value::StdInstance(inst) = receiver else {
        return Err(EvalError::MalformedInstance(type_name.to_string()));
    };
    let fields = inst.fields.lock().unwrap();
    let internal = fields
        .get("__internal")
        .ok_or_else(|| EvalError::MissingInternalField(type_name.to_string()))?;
    let guard = internal.lock().unwrap();
    match &*guard {
        Value::TypedVal(t) if t.type_tag == type_name => (t.payload.clone() as Arc<dyn Any + Send + Sync>)
            .downcast::<T>()
            .map_err(|_| EvalError::MalformedInstance(type_name.to_string())),
        _ => Err(EvalError::MalformedInstance(type_name.to_string())),
    }
}

pub type MethodTable = HashMap<String, NativeMethod>;

/// Register all container types into a `name -> type` table for the
/// registry to hand out on `new T(...)`.
pub fn all_types() -> HashMap<String, Arc<StdStructDef>> {
    let mut m = HashMap::new();
    m.insert("array_list".to_string(), array_list::type_def());
    m.insert("linked_list".to_string(), linked_list::type_def());
    m.insert("stack".to_string(), stack::type_def());
    m.insert("queue".to_string(), queue::type_def());
    m.insert("deque".to_string(), deque::type_def());
    m.insert("map".to_string(), hash_map::type_def());
    m.insert("set".to_string(), hash_set::type_def());
    m.insert("heap".to_string(), heap::type_def());
    m.insert("treap".to_string(), treap::type_def());
    m.insert("adjacency_list".to_string(), adjacency_list::type_def());
    m.insert("adjacency_matrix".to_string(), adjacency_matrix::type_def());
    m.insert("graph".to_string(), graph::type_def());
    m.insert("vector".to_string(), vector::type_def());
    m.insert("matrix".to_string(), matrix::type_def());
    m
}
