//! Builtin registry (C4, spec.md §4.4): the module loader and the
//! std-struct type table `new` dispatches through.
//!
//! Two registration paths, matching spec.md §3.3 exactly: modules are
//! lazily-built `object` values memoised on first `import`; std-struct
//! types are type descriptors built once at registry construction
//! (container types have no state of their own — each `new T(...)`
//! call makes a fresh instance from the shared descriptor).

use crate::containers;
use crate::modules;
use crate::writers::Writers;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use zima_core::env::Env;
use zima_core::error::EvalError;
use zima_core::value::{StdStructDef, Value};

type ModuleLoader = Arc<dyn Fn(&Writers) -> Value + Send + Sync>;

pub struct Registry {
    pub writers: Writers,
    loaders: HashMap<String, ModuleLoader>,
    pub types: HashMap<String, Arc<StdStructDef>>,
}

impl Registry {
    /// Built inside `Arc::new_cyclic` because the `thread` std-struct's
    /// constructor needs a (weak) handle back to this registry to
    /// evaluate its worker's function call (spec.md §4.8) — a thread
    /// is otherwise just a std-struct type like any container, built
    /// once here and instantiated per `new thread(...)`.
    pub fn new(writers: Writers) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Registry>| {
            let mut loaders: HashMap<String, ModuleLoader> = HashMap::new();
            loaders.insert("array".to_string(), Arc::new(|_| modules::array::build()));
            loaders.insert("math".to_string(), Arc::new(|_| modules::math::build()));
            loaders.insert("string".to_string(), Arc::new(|_| modules::string::build()));
            loaders.insert("fs".to_string(), Arc::new(|_| modules::fs::build()));
            loaders.insert("path".to_string(), Arc::new(|_| modules::path::build()));
            loaders.insert("time".to_string(), Arc::new(|_| modules::time::build()));
            loaders.insert("json".to_string(), Arc::new(|_| modules::json::build()));
            loaders.insert("csv".to_string(), Arc::new(|_| modules::csv::build()));
            loaders.insert("random".to_string(), Arc::new(|_| modules::random::build()));
            loaders.insert("sys".to_string(), Arc::new(|_| modules::sys::build()));
            loaders.insert("debug".to_string(), Arc::new(|w| modules::debug::build(w.clone())));
            loaders.insert("stat".to_string(), Arc::new(|_| modules::stat::build()));

            let mut types = containers::all_types();
            types.insert("sqlite".to_string(), crate::sqlite::type_def());
            types.insert("thread".to_string(), crate::thread::type_def(weak.clone()));

            Registry { writers, loaders, types }
        })
    }

    /// `import name`: load once, memoise in the root environment, bind
    /// in the calling scope (spec.md §4.4).
    pub fn import(&self, name: &str, env: &Env) -> Result<(), EvalError> {
        let root = env.root();
        let module = match root.lookup(name) {
            Ok(existing) => existing,
            Err(_) => {
                let loader = self.loaders.get(name).ok_or_else(|| EvalError::UnknownModule(name.to_string()))?;
                tracing::debug!(module = name, "loading builtin module");
                let module = loader(&self.writers);
                root.define(name, module.clone());
                module
            }
        };
        env.define(name, module);
        Ok(())
    }

    pub fn lookup_type(&self, name: &str) -> Result<Arc<StdStructDef>, EvalError> {
        self.types.get(name).cloned().ok_or_else(|| EvalError::UnknownType(name.to_string()))
    }
}
