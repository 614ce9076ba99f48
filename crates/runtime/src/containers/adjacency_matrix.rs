//! `adjacency_matrix`: a fixed-size directed graph over integer node
//! indices `0..n` (spec.md §4.5). Size is fixed at construction.

use super::{downcast, make_instance};
use crate::util::{expect_arity, expect_number, index_to_usize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::value::{NativeFn, NativeMethod, StdStructDef, Value};

pub struct AdjacencyMatrixData {
    n: usize,
    edges: Mutex<Vec<bool>>,
}

impl AdjacencyMatrixData {
    fn idx(&self, u: usize, v: usize) -> usize {
        u * self.n + v
    }
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 1, "adjacency_matrix constructor")?;
            let n = expect_number(&args[0], "adjacency_matrix constructor")? as usize;
            let ty = ty.upgrade().expect("adjacency_matrix type registered");
            Ok(make_instance(ty, AdjacencyMatrixData { n, edges: Mutex::new(vec![false; n * n]) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("add_edge".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "adjacency_matrix.add_edge")?;
            let data = downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?;
            let u = index_to_usize(expect_number(&args[0], "adjacency_matrix.add_edge")?, data.n, "adjacency_matrix.add_edge")?;
            let v = index_to_usize(expect_number(&args[1], "adjacency_matrix.add_edge")?, data.n, "adjacency_matrix.add_edge")?;
            let idx = data.idx(u, v);
            data.edges.lock().unwrap()[idx] = true;
            Ok(Value::Nil)
        }));

        methods.insert("remove_edge".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "adjacency_matrix.remove_edge")?;
            let data = downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?;
            let u = index_to_usize(expect_number(&args[0], "adjacency_matrix.remove_edge")?, data.n, "adjacency_matrix.remove_edge")?;
            let v = index_to_usize(expect_number(&args[1], "adjacency_matrix.remove_edge")?, data.n, "adjacency_matrix.remove_edge")?;
            let idx = data.idx(u, v);
            data.edges.lock().unwrap()[idx] = false;
            Ok(Value::Nil)
        }));

        methods.insert("contains_edge".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 2, "adjacency_matrix.contains_edge")?;
            let data = downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?;
            let u = index_to_usize(expect_number(&args[0], "adjacency_matrix.contains_edge")?, data.n, "adjacency_matrix.contains_edge")?;
            let v = index_to_usize(expect_number(&args[1], "adjacency_matrix.contains_edge")?, data.n, "adjacency_matrix.contains_edge")?;
            let idx = data.idx(u, v);
            Ok(Value::Bool(data.edges.lock().unwrap()[idx]))
        }));

        methods.insert("size".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_matrix.size")?;
            Ok(Value::Number(downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?.n as f64))
        }));

        methods.insert("empty".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_matrix.empty")?;
            Ok(Value::Bool(downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?.n == 0))
        }));

        methods.insert("edges".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_matrix.edges")?;
            let data = downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?;
            let edges = data.edges.lock().unwrap();
            let mut out = Vec::new();
            for u in 0..data.n {
                for v in 0..data.n {
                    if edges[data.idx(u, v)] {
                        out.push(Value::Pair(Arc::new((Value::Number(u as f64), Value::Number(v as f64)))));
                    }
                }
            }
            Ok(Value::array(out))
        }));

        methods.insert("clear".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_matrix.clear")?;
            let data = downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?;
            data.edges.lock().unwrap().iter_mut().for_each(|e| *e = false);
            Ok(Value::Nil)
        }));

        methods.insert("str".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "adjacency_matrix.str")?;
            let data = downcast::<AdjacencyMatrixData>(recv, "adjacency_matrix")?;
            Ok(Value::string(format!("<adjacency_matrix {}x{}>", data.n, data.n)))
        }));

        StdStructDef { name: "adjacency_matrix".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_and_contains_edge() {
        let ty = type_def();
        let m = (ty.constructor)(&[Value::Number(3.0)]).unwrap();
        (ty.methods["add_edge"])(&m, &[Value::Number(0.0), Value::Number(1.0)]).unwrap();
        assert!(matches!((ty.methods["contains_edge"])(&m, &[Value::Number(0.0), Value::Number(1.0)]).unwrap(), Value::Bool(true)));
        (ty.methods["remove_edge"])(&m, &[Value::Number(0.0), Value::Number(1.0)]).unwrap();
        assert!(matches!((ty.methods["contains_edge"])(&m, &[Value::Number(0.0), Value::Number(1.0)]).unwrap(), Value::Bool(false)));
    }
}
