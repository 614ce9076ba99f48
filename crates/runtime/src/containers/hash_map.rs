//! `map` (spec.md's `hash_map`): arbitrary-`Value`-keyed table.
//!
//! Keys compare via `zima_core::value::equal`, so numbers, strings, and
//! other primitives all work as keys; this costs a linear scan per
//! lookup but keeps the key type as general as the language's own
//! `equal`, matching the spec's "mapping from byte to count"-style
//! tables used elsewhere in the codec without inventing a second,
//! narrower key type here.

use super::{downcast, make_instance};
use crate::util::expect_arity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value, equal};

pub struct MapData {
    entries: Mutex<Vec<(Value, Value)>>,
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "map constructor")?;
            let ty = ty.upgrade().expect("map type registered");
            Ok(make_instance(ty, MapData { entries: Mutex::new(Vec::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("put".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "map.put")?;
            let data = downcast::<MapData>(recv, "map")?;
            let mut entries = data.entries.lock().unwrap();
            if let Some(slot) = entries.iter_mut().find(|(k, _)| equal(k, &args[0])) {
                slot.1 = args[1].clone();
            } else {
                entries.push((args[0].clone(), args[1].clone()));
            }
            Ok(Value::Nil)
        }));

        methods.insert("get".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "map.get")?;
            let data = downcast::<MapData>(recv, "map")?;
            let entries = data.entries.lock().unwrap();
            Ok(entries.iter().find(|(k, _)| equal(k, &args[0])).map(|(_, v)| v.clone()).unwrap_or(Value::Nil))
        }));

        methods.insert("remove".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "map.remove")?;
            let data = downcast::<MapData>(recv, "map")?;
            let mut entries = data.entries.lock().unwrap();
            if let Some(pos) = entries.iter().position(|(k, _)| equal(k, &args[0])) {
                Ok(entries.remove(pos).1)
            } else {
                Ok(Value::Nil)
            }
        }));

        methods.insert("contains".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "map.contains")?;
            let data = downcast::<MapData>(recv, "map")?;
            Ok(Value::Bool(data.entries.lock().unwrap().iter().any(|(k, _)| equal(k, &args[0]))))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "map.clear")?;
            downcast::<MapData>(recv, "map")?.entries.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "map.size")?;
            Ok(Value::Number(downcast::<MapData>(recv, "map")?.entries.lock().unwrap().len() as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "map.empty")?;
            Ok(Value::Bool(downcast::<MapData>(recv, "map")?.entries.lock().unwrap().is_empty()))
        }));

        methods.insert("items".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "map.items")?;
            let data = downcast::<MapData>(recv, "map")?;
            let pairs: Vec<Value> = data
                .entries
                .lock()
                .unwrap()
                .iter()
                .map(|(k, v)| Value::Pair(Arc::new((k.clone(), v.clone()))))
                .collect();
            Ok(Value::array(pairs))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "map.str")?;
            let data = downcast::<MapData>(recv, "map")?;
            let pairs: Vec<Value> = data
                .entries
                .lock()
                .unwrap()
                .iter()
                .map(|(k, v)| Value::Pair(Arc::new((k.clone(), v.clone()))))
                .collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(pairs))))
        }));

        StdStructDef { name: "map".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_contains_remove() {
        let ty = type_def();
        let m = (ty.constructor)(&[]).unwrap();
        (ty.methods["put"])(&m, &[Value::string("a"), Value::Number(1.0)]).unwrap();
        assert_eq!((ty.methods["get"])(&m, &[Value::string("a")]).unwrap(), Value::Number(1.0));
        assert!(matches!((ty.methods["contains"])(&m, &[Value::string("a")]).unwrap(), Value::Bool(true)));
        (ty.methods["remove"])(&m, &[Value::string("a")]).unwrap();
        assert_eq!((ty.methods["get"])(&m, &[Value::string("a")]).unwrap(), Value::Nil);
    }
}
