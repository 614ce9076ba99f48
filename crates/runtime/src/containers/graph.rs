//! `graph`: an undirected graph that auto-adds nodes referenced by an
//! edge (spec.md §4.5) — distinct from `adjacency_list`'s directed
//! semantics in that `add_edge(u, v)` also links `v -> u`.

use super::{downcast, make_instance};
use crate::util::expect_arity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value, equal};

pub struct GraphData {
    adjacency: Mutex<Vec<(Value, Vec<Value>)>>,
}

fn ensure_node(adjacency: &mut Vec<(Value, Vec<Value>)>, node: &Value) {
    if !adjacency.iter().any(|(k, _)| equal(k, node)) {
        adjacency.push((node.clone(), Vec::new()));
    }
}

fn link(adjacency: &mut Vec<(Value, Vec<Value>)>, from: &Value, to: &Value) {
    let entry = adjacency.iter_mut().find(|(k, _)| equal(k, from)).unwrap();
    if !entry.1.iter().any(|n| equal(n, to)) {
        entry.1.push(to.clone());
    }
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 0, "graph constructor")?;
            let ty = ty.upgrade().expect("graph type registered");
            Ok(make_instance(ty, GraphData { adjacency: Mutex::new(Vec::new()) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("add_edge".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "graph.add_edge")?;
            let data = downcast::<GraphData>(recv, "graph")?;
            let mut adjacency = data.adjacency.lock().unwrap();
            ensure_node(&mut adjacency, &args[0]);
            ensure_node(&mut adjacency, &args[1]);
            link(&mut adjacency, &args[0], &args[1]);
            link(&mut adjacency, &args[1], &args[0]);
            Ok(Value::Nil)
        }));

        methods.insert("has_node".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 1, "graph.has_node")?;
            let data = downcast::<GraphData>(recv, "graph")?;
            Ok(Value::Bool(data.adjacency.lock().unwrap().iter().any(|(k, _)| equal(k, &args[0]))))
        }));

        methods.insert("has_edge".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "graph.has_edge")?;
            let data = downcast::<GraphData>(recv, "graph")?;
            let adjacency = data.adjacency.lock().unwrap();
            Ok(Value::Bool(
                adjacency
                    .iter()
                    .find(|(k, _)| equal(k, &args[0]))
                    .is_some_and(|(_, neighbors)| neighbors.iter().any(|n| equal(n, &args[1]))),
            ))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "graph.clear")?;
            downcast::<GraphData>(recv, "graph")?.adjacency.lock().unwrap().clear();
            Ok(Value::Nil)
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "graph.size")?;
            Ok(Value::Number(downcast::<GraphData>(recv, "graph")?.adjacency.lock().unwrap().len() as f64))
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "graph.str")?;
            let data = downcast::<GraphData>(recv, "graph")?;
            let pairs: Vec<Value> = data
                .adjacency
                .lock()
                .unwrap()
                .iter()
                .map(|(k, v)| Value::Pair(Arc::new((k.clone(), Value::array(v.clone())))))
                .collect();
            Ok(Value::string(zima_core::value::to_string(&Value::array(pairs))))
        }));

        StdStructDef { name: "graph".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_symmetric_and_auto_adds_nodes() {
        let ty = type_def();
        let g = (ty.constructor)(&[]).unwrap();
        (ty.methods["add_edge"])(&g, &[Value::string("a"), Value::string("b")]).unwrap();
        assert!(matches!((ty.methods["has_node"])(&g, &[Value::string("a")]).unwrap(), Value::Bool(true)));
        assert!(matches!((ty.methods["has_edge"])(&g, &[Value::string("b"), Value::string("a")]).unwrap(), Value::Bool(true)));
    }
}
