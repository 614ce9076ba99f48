//! Value model, environment chain and AST types for the Zima language
//! toolchain (spec.md §3).

pub mod ast;
pub mod env;
pub mod error;
pub mod value;

pub use env::{Env, Scope};
pub use error::EvalError;
pub use value::{Cell, OrderedFieldMap, OrderedMap, Value};
