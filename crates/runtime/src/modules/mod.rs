//! Thin builtin shims (C8, spec.md §4.4/§6): module-namespace
//! functions loaded lazily by `import`. Each module is a plain
//! `object` `Value` whose entries are native-backed `function`
//! values — no module here calls back into the evaluator, so none of
//! them need a `Registry` reference; they are one-line wrappers over
//! host-OS or math-library primitives exactly as spec.md §1 scopes
//! them.

pub mod array;
pub mod csv;
pub mod debug;
pub mod fs;
pub mod json;
pub mod math;
pub mod path;
pub mod random;
pub mod stat;
pub mod string;
pub mod sys;
pub mod time;

use std::sync::Arc;
use zima_core::env::Scope;
use zima_core::error::EvalError;
use zima_core::value::{FunctionBody, FunctionData, OrderedMap, Value};

/// Wrap a plain handler as a first-class `function` Value a module
/// object can expose. `params`/`env` are unused for native bodies
/// (spec.md §3.1's `FunctionData` doc comment).
pub fn native_fn(f: impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static) -> Value {
    Value::Function(Arc::new(FunctionData {
        params: Vec::new(),
        body: FunctionBody::Native(Arc::new(f)),
        env: Scope::root(),
    }))
}

/// Build a module `object` Value from `(name, value)` entries.
pub fn module(entries: Vec<(&str, Value)>) -> Value {
    let mut map = OrderedMap::new();
    for (k, v) in entries {
        map.insert(k.to_string(), v);
    }
    Value::object(map)
}
