//! Environment: a tree of lexical scopes (spec.md §3.2/§4.2).
//!
//! A scope is created for every block, function call, loop iteration
//! body, and conditional branch. `lookup`/`assign` walk the parent
//! chain; `define` always binds in the current scope. Bindings live
//! behind `Mutex` rather than `RefCell` so a `Scope` chain is honestly
//! `Send + Sync`: the thread primitive (spec.md §4.8) hands a cloned
//! chain to a real OS thread, and every cell in it must be safe to
//! touch from either side.

use crate::error::EvalError;
use crate::value::{Cell, Value, new_cell};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub type Env = Arc<Scope>;

pub struct Scope {
    parent: Option<Env>,
    bindings: Mutex<HashMap<String, Cell>>,
    consts: Mutex<HashSet<String>>,
}

impl Scope {
    pub fn root() -> Env {
        Arc::new(Scope {
            parent: None,
            bindings: Mutex::new(HashMap::new()),
            consts: Mutex::new(HashSet::new()),
        })
    }

    pub fn child(parent: &Env) -> Env {
        Arc::new(Scope {
            parent: Some(parent.clone()),
            bindings: Mutex::new(HashMap::new()),
            consts: Mutex::new(HashSet::new()),
        })
    }

    pub fn define(&self, name: &str, value: Value) {
        self.bindings.lock().unwrap().insert(name.to_string(), new_cell(value));
    }

    pub fn define_const(&self, name: &str, value: Value) {
        self.define(name, value);
        self.consts.lock().unwrap().insert(name.to_string());
    }

    /// Find the binding cell for `name`, walking toward the root.
    pub fn lookup_cell(&self, name: &str) -> Option<Cell> {
        if let Some(cell) = self.bindings.lock().unwrap().get(name) {
            return Some(cell.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup_cell(name))
    }

    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.lookup_cell(name)
            .map(|cell| cell.lock().unwrap().clone())
            .ok_or_else(|| EvalError::UnboundName(name.to_string()))
    }

    /// Update the nearest enclosing binding. Fails if unbound, or if
    /// that binding was introduced with `const`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if let Some(cell) = self.bindings.lock().unwrap().get(name) {
            if self.consts.lock().unwrap().contains(name) {
                return Err(EvalError::ImmutableReassign(name.to_string()));
            }
            *cell.lock().unwrap() = value;
            return Ok(());
        }
        match &self.parent {
            Some(p) => p.assign(name, value),
            None => Err(EvalError::UnboundName(name.to_string())),
        }
    }

    /// Walk to the outermost scope. Used to memoise `import`ed modules
    /// in the root environment (spec.md §4.4) regardless of how deep
    /// the `import` statement itself is nested.
    pub fn root(self: &Env) -> Env {
        match &self.parent {
            Some(p) => p.root(),
            None => self.clone(),
        }
    }

    /// Produce a detached snapshot for thread handoff (spec.md §3.2):
    /// the chain of scopes is rebuilt node-for-node, but every binding
    /// cell is the *same* `Arc<Mutex<Value>>` as the original, so
    /// mutation through either snapshot is visible to the other.
    /// Subsequent `define`s in either snapshot do not leak to its twin.
    pub fn clone_for_thread(self: &Env) -> Env {
        let parent = self.parent.as_ref().map(|p| p.clone_for_thread());
        Arc::new(Scope {
            parent,
            bindings: Mutex::new(self.bindings.lock().unwrap().clone()),
            consts: Mutex::new(self.consts.lock().unwrap().clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parent_chain() {
        let root = Scope::root();
        root.define("x", Value::Number(1.0));
        let child = Scope::child(&root);
        assert_eq!(child.lookup("x").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_updates_nearest_enclosing_binding() {
        let root = Scope::root();
        root.define("x", Value::Number(1.0));
        let child = Scope::child(&root);
        child.assign("x", Value::Number(2.0)).unwrap();
        assert_eq!(root.lookup("x").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn assign_unbound_name_fails() {
        let root = Scope::root();
        assert!(matches!(root.assign("missing", Value::Nil), Err(EvalError::UnboundName(_))));
    }

    #[test]
    fn const_rebinding_is_a_hard_error() {
        let root = Scope::root();
        root.define_const("x", Value::Number(1.0));
        assert!(matches!(root.assign("x", Value::Number(2.0)), Err(EvalError::ImmutableReassign(_))));
    }

    #[test]
    fn cloned_environment_shares_cells_but_not_new_definitions() {
        let root = Scope::root();
        root.define("shared", Value::Number(1.0));
        let clone = root.clone_for_thread();

        // Mutation through the clone is visible via the original's cell.
        clone.assign("shared", Value::Number(9.0)).unwrap();
        assert_eq!(root.lookup("shared").unwrap(), Value::Number(9.0));

        // A define in the clone does not leak back to the original.
        clone.define("only_in_clone", Value::Bool(true));
        assert!(root.lookup("only_in_clone").is_err());
    }

    #[test]
    fn env_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Scope>();
    }
}
