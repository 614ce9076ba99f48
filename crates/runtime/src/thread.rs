//! `thread` native type (C4 subset, spec.md §4.8): `new thread(fn,
//! args...)` clones the closure's captured environment, spawns a real
//! OS thread to invoke it, and exposes `join()`/`done()`.
//!
//! The environment clone shares binding *cells* with the parent scope
//! (spec.md §3.2) but not the parent's later `define`s — the hazard
//! spec.md §9 calls out explicitly. No channel is provided; shared
//! mutation races through the caller's own discipline.

use crate::containers::{downcast, make_instance};
use crate::registry::Registry;
use crate::util::expect_arity;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{FunctionBody, FunctionData, NativeFn, NativeMethod, StdStructDef, Value};

pub struct ThreadData {
    done: Arc<AtomicBool>,
    handle: Mutex<Option<std::thread::JoinHandle<Result<Value, EvalError>>>>,
    result: Mutex<Option<Result<Value, EvalError>>>,
}

pub fn type_def(registry: Weak<Registry>) -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let registry = registry.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            if args.is_empty() {
                return Err(EvalError::ArityMismatch { expected: 1, got: 0, context: "thread constructor".into() });
            }
            let fn_value = args[0].deref();
            let call_args = args[1..].to_vec();
            let Value::Function(f) = &fn_value else {
                return Err(EvalError::NotCallable(fn_value.type_name().to_string()));
            };
            let cloned_env = f.env.clone_for_thread();
            let cloned_fn = Value::Function(Arc::new(FunctionData {
                params: f.params.clone(),
                body: f.body.clone(),
                env: cloned_env,
            }));

            let done = Arc::new(AtomicBool::new(false));
            let done_for_worker = done.clone();
            let registry_for_worker = registry.clone();
            tracing::debug!("spawning thread");
            let handle = std::thread::spawn(move || {
                let registry = registry_for_worker.upgrade().expect("registry outlives its threads");
                let result = crate::eval::call_value(&cloned_fn, &call_args, &registry);
                done_for_worker.store(true, AtomicOrdering::SeqCst);
                result
            });

            let ty = ty.upgrade().expect("thread type registered");
            Ok(make_instance(
                ty,
                ThreadData { done, handle: Mutex::new(Some(handle)), result: Mutex::new(None) },
            ))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("join".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "thread.join")?;
            let data = downcast::<ThreadData>(recv, "thread")?;
            let mut handle_slot = data.handle.lock().unwrap();
            if let Some(handle) = handle_slot.take() {
                let result = handle.join().unwrap_or_else(|_| Err(EvalError::NotCallable("thread panicked".into())));
                *data.result.lock().unwrap() = Some(result.clone());
                return result;
            }
            data.result.lock().unwrap().clone().unwrap_or(Ok(Value::Nil))
        }));

        methods.insert("done".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "thread.done")?;
            let data = downcast::<ThreadData>(recv, "thread")?;
            Ok(Value::Bool(data.done.load(AtomicOrdering::SeqCst)))
        }));

        StdStructDef { name: "thread".to_string(), constructor, methods }
    })
}
