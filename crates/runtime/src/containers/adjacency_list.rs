//! `adjacency_list`: a directed graph keyed by node identity (spec.md
//! §4.5). Nodes and neighbor lists are plain `Value`s compared via
//! `equal`, so node identifiers can be numbers, strings, or anything
//! else scripts use as a label.

use super::{downcast, make_instance};
use crate::util::expect_arity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value, equal};

pub struct AdjacencyListData {
    adjacency: Mutex<Vec<(Value, Vec<Value>)>>,
}

fn find_or_insert<'a>(adjacency: &'a mut Vec<(Value, Vec<Value>)>, node: &Value) -> &'a mut Vec<Value> {
    if !adjacency.iter().any(|(k, _)| equal(k, node)) {
        adjacency.push((node.clone(), Vec::new()));
    }
    &mut adjacency.iter_mut().find(|(k, _)| equal(k, node)).unwrap().1
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "adjacency_list constructor")?;
            let ty = ty.upgrade().expect("adjacency_list type registered");
            Ok(make_instance(ty, AdjacencyListData { adjacency: Mutex::new(Vec::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("add_edge".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "adjacency_list.add_edge")?;
            let data = downcast::<AdjacencyListData>(recv, "adjacency_list")?;
            let mut adjacency = data.adjacency.lock().unwrap();
            find_or_insert(&mut adjacency, &args[1]);
            let neighbors = find_or_insert(&mut adjacency, &args[0]);
            if !neighbors.iter().any(|n| equal(n, &args[1])) {
                neighbors.push(args[1].clone());
            }
            Ok(Value::Nil)
        }));

        methods.insert("get_neighbors".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "adjacency_list.get_neighbors")?;
            let data = downcast::<AdjacencyListData>(recv, "adjacency_list")?;
            let adjacency = data.adjacency.lock().unwrap();
            let neighbors = adjacency.iter().find(|(k, _)| equal(k, &args[0])).map(|(_, n)| n.clone()).unwrap_or_default();
            Ok(Value::array(neighbors))
        }));

        methods.insert("contains".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "adjacency_list.contains")?;
            let data = downcast::<AdjacencyListData>(recv, "adjacency_list")?;
            Ok(Value::Bool(data.adjacency.lock().unwrap().iter().any(|(k, _)| equal(k, &args[0]))))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_list.clear")?;
            downcast::<AdjacencyListData>(recv, "adjacency_list")?.adjacency.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_list.size")?;
            Ok(Value::Number(downcast::<AdjacencyListData>(recv, "adjacency_list")?.adjacency.lock().unwrap().len() as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_list.empty")?;
            Ok(Value::Bool(downcast::<AdjacencyListData>(recv, "adjacency_list")?.adjacency.lock().unwrap().is_empty()))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_list.str")?;
            let data = downcast::<AdjacencyListData>(recv, "adjacency_list")?;
            let pairs: Vec<Value> = data
                .adjacency
                .lock()
                .unwrap()
                .iter()
                .map(|(k, v)| Value::Pair(Arc::new((k.clone(), Value::array(v.clone())))))
                .collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(pairs))))
        }));

        StdStructDef { name: "adjacency_list".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_auto_adds_target_node() {
        let ty = type_def();
        let g = (ty.constructor)(&[]).unwrap();
        (ty.methods["add_edge"])(&g, &[Value::string("a"), Value::string("b")]).unwrap();
        assert!(matches!((ty.methods["contains"])(&g, &[Value::string("b")]).unwrap(), Value::Bool(true)));
        let neighbors = (ty.methods["get_neighbors"])(&g, &[Value::string("a")]).unwrap();
        assert_eq!(neighbors, Value::array(vec![Value::string("b")]));
    }
}
