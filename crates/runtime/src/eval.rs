//! Evaluator (C3, spec.md §4.3): reduces AST expressions/statements to
//! `Value`s. Control-flow signals (`break_signal`/`continue_signal`/
//! `return_signal`) are ordinary `Value`s threaded through the normal
//! `eval_stmt` return channel rather than a separate exception path —
//! loops intercept the first two, function calls intercept the third.

use crate::registry::Registry;
use zima_core::ast::{BinaryOp, Block, Expr, Literal, LogicalOp, Program, Stmt, UnaryOp};
use zima_core::env::{Env, Scope};
use zima_core::error::EvalError;
use zima_core::value::{
    BoundMethodData, Cell, FunctionBody, FunctionData, OrderedMap, Value, equal, less, new_cell, to_string, truthy,
};
use std::sync::Arc;

pub fn eval_program(program: &Program, env: &Env, registry: &Registry) -> Result<Value, EvalError> {
    exec_stmts(&program.statements, env, registry)
}

fn exec_stmts(stmts: &[Stmt], env: &Env, registry: &Registry) -> Result<Value, EvalError> {
    let mut result = Value::Nil;
    for stmt in stmts {
        result = eval_stmt(stmt, env, registry)?;
        if is_signal(&result) {
            return Ok(result);
        }
    }
    Ok(result)
}

fn is_signal(v: &Value) -> bool {
    matches!(v, Value::BreakSignal | Value::ContinueSignal | Value::ReturnSignal(_))
}

pub fn eval_stmt(stmt: &Stmt, env: &Env, registry: &Registry) -> Result<Value, EvalError> {
    match stmt {
        Stmt::Expr(e) => eval_expr(e, env, registry),
        Stmt::Let { name, value } => {
            let v = eval_expr(value, env, registry)?;
            env.define(name, v);
            Ok(Value::Nil)
        }
        Stmt::Const { name, value } => {
            let v = eval_expr(value, env, registry)?;
            env.define_const(name, v);
            Ok(Value::Nil)
        }
        Stmt::If { cond, then_branch, else_branch } => {
            if truthy(&eval_expr(cond, env, registry)?) {
                exec_stmts(then_branch, &Scope::child(env), registry)
            } else if let Some(else_b) = else_branch {
                exec_stmts(else_b, &Scope::child(env), registry)
            } else {
                Ok(Value::Nil)
            }
        }
        Stmt::While { cond, body } => eval_while(cond, body, env, registry),
        Stmt::Foreach { var, iterable, body } => eval_foreach(var, iterable, body, env, registry),
        Stmt::Break => Ok(Value::BreakSignal),
        Stmt::Continue => Ok(Value::ContinueSignal),
        Stmt::Return(expr) => {
            let v = match expr {
                Some(e) => eval_expr(e, env, registry)?,
                None => Value::Nil,
            };
            Ok(Value::ReturnSignal(Box::new(v)))
        }
        Stmt::FunctionDecl { name, params, body } => {
            let f = make_closure(params.clone(), body.clone(), env);
            env.define(name, f);
            Ok(Value::Nil)
        }
        Stmt::Import(name) => {
            registry.import(name, env)?;
            Ok(Value::Nil)
        }
        Stmt::Block(block) => exec_stmts(block, &Scope::child(env), registry),
    }
}

fn eval_while(cond: &Expr, body: &Block, env: &Env, registry: &Registry) -> Result<Value, EvalError> {
    while truthy(&eval_expr(cond, env, registry)?) {
        let r = exec_stmts(body, &Scope::child(env), registry)?;
        match r {
            Value::BreakSignal => break,
            Value::ReturnSignal(_) => return Ok(r),
            _ => {}
        }
    }
    Ok(Value::Nil)
}

fn eval_foreach(var: &str, iterable: &Expr, body: &Block, env: &Env, registry: &Registry) -> Result<Value, EvalError> {
    let iterable_val = eval_expr(iterable, env, registry)?;
    // Snapshot via `items()`: mutating a container mid-iteration walks
    // the snapshot, not live state (spec.md §9, preserved deliberately).
    let items = iterable_to_items(&iterable_val)?;
    for item in items {
        let child = Scope::child(env);
        child.define(var, item);
        let r = exec_stmts(body, &child, registry)?;
        match r {
            Value::BreakSignal => break,
            Value::ReturnSignal(_) => return Ok(r),
            _ => {}
        }
    }
    Ok(Value::Nil)
}

fn iterable_to_items(v: &Value) -> Result<Vec<Value>, EvalError> {
    match v.deref() {
        Value::Array(a) => Ok(a.lock().unwrap().clone()),
        Value::Str(s) => Ok(s.iter().map(|b| Value::string(vec![*b])).collect()),
        Value::Object(o) => Ok(o.lock().unwrap().iter().map(|(k, _)| Value::string(k.clone())).collect()),
        Value::StdInstance(inst) => {
            let items_method = inst.ty.methods.get("items").ok_or_else(|| EvalError::TypeMismatch {
                expected: "an iterable".into(),
                got: format!("std_instance of '{}' with no items method", inst.ty.name),
                context: "foreach".into(),
            })?;
            let receiver = Value::StdInstance(inst.clone());
            match items_method(&receiver, &[])?.deref() {
                Value::Array(a) => Ok(a.lock().unwrap().clone()),
                other => Err(EvalError::TypeMismatch {
                    expected: "items() to return an array".into(),
                    got: other.type_name().into(),
                    context: "foreach".into(),
                }),
            }
        }
        other => Err(EvalError::TypeMismatch { expected: "an iterable".into(), got: other.type_name().into(), context: "foreach".into() }),
    }
}

fn make_closure(params: Vec<String>, body: Block, env: &Env) -> Value {
    Value::Function(Arc::new(FunctionData { params, body: FunctionBody::Ast(body), env: env.clone() }))
}

pub fn eval_expr(expr: &Expr, env: &Env, registry: &Registry) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(lit) => Ok(literal_value(lit)),
        Expr::Identifier(name) => env.lookup(name),
        Expr::ArrayLit(items) => {
            let vals = items.iter().map(|e| eval_expr(e, env, registry)).collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(vals))
        }
        Expr::ObjectLit(pairs) => {
            let mut map = OrderedMap::new();
            for (k, e) in pairs {
                map.insert(k.clone(), eval_expr(e, env, registry)?);
            }
            Ok(Value::object(map))
        }
        Expr::Index { target, index } => {
            let t = eval_expr(target, env, registry)?.deref();
            let i = eval_expr(index, env, registry)?;
            index_value(&t, &i)
        }
        Expr::Member { target, name } => {
            let t = eval_expr(target, env, registry)?.deref();
            member_access(&t, name)
        }
        Expr::Call { callee, args } => {
            let callee_val = eval_expr(callee, env, registry)?;
            let arg_vals = args.iter().map(|a| eval_expr(a, env, registry)).collect::<Result<Vec<_>, _>>()?;
            call_value(&callee_val, &arg_vals, registry)
        }
        Expr::New { type_name, args } => {
            let ty = registry.lookup_type(type_name)?;
            let arg_vals = args.iter().map(|a| eval_expr(a, env, registry)).collect::<Result<Vec<_>, _>>()?;
            (ty.constructor)(&arg_vals)
        }
        Expr::Unary { op, expr } => eval_unary(*op, &eval_expr(expr, env, registry)?),
        Expr::Binary { op, lhs, rhs } => {
            let a = eval_expr(lhs, env, registry)?;
            let b = eval_expr(rhs, env, registry)?;
            eval_binary(*op, &a, &b)
        }
        Expr::Logical { op, lhs, rhs } => {
            let a = eval_expr(lhs, env, registry)?;
            match op {
                LogicalOp::And => if truthy(&a) { eval_expr(rhs, env, registry) } else { Ok(a) },
                LogicalOp::Or => if truthy(&a) { Ok(a) } else { eval_expr(rhs, env, registry) },
            }
        }
        Expr::Assign { target, value } => {
            let v = eval_expr(value, env, registry)?;
            assign_to(target, v.clone(), env, registry)?;
            Ok(v)
        }
        Expr::Range { start, end } => eval_range(start, end, env, registry),
        Expr::Function { params, body } => Ok(make_closure(params.clone(), body.clone(), env)),
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Nil => Value::Nil,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(bytes) => Value::string(bytes.clone()),
    }
}

/// `a..b`, half-open `[a, b)` (spec.md §9 pins this over the source's
/// two conflicting drafts), presented as an array (spec.md §4.3).
fn eval_range(start: &Expr, end: &Expr, env: &Env, registry: &Registry) -> Result<Value, EvalError> {
    let s = expect_number_value(&eval_expr(start, env, registry)?, "range")?.floor() as i64;
    let e = expect_number_value(&eval_expr(end, env, registry)?, "range")?.floor() as i64;
    let items: Vec<Value> = if s < e {
        (s..e).map(|n| Value::Number(n as f64)).collect()
    } else if s > e {
        (e + 1..=s).rev().map(|n| Value::Number(n as f64)).collect()
    } else {
        Vec::new()
    };
    Ok(Value::array(items))
}

fn expect_number_value(v: &Value, context: &str) -> Result<f64, EvalError> {
    match v.deref() {
        Value::Number(n) => Ok(n),
        other => Err(EvalError::TypeMismatch { expected: "number".into(), got: other.type_name().into(), context: context.to_string() }),
    }
}

fn index_value(t: &Value, i: &Value) -> Result<Value, EvalError> {
    match t {
        Value::Array(a) => {
            let items = a.lock().unwrap();
            let idx = expect_number_value(i, "index")?.floor() as i64;
            if idx < 0 || idx as usize >= items.len() {
                return Err(EvalError::OutOfBounds { index: idx, len: items.len(), context: "index".into() });
            }
            Ok(items[idx as usize].clone())
        }
        Value::Object(o) => {
            let key = expect_string_key(i)?;
            Ok(o.lock().unwrap().get(&key).cloned().unwrap_or(Value::Nil))
        }
        Value::Str(s) => {
            let idx = expect_number_value(i, "index")?.floor() as i64;
            if idx < 0 || idx as usize >= s.len() {
                return Err(EvalError::OutOfBounds { index: idx, len: s.len(), context: "index".into() });
            }
            Ok(Value::string(vec![s[idx as usize]]))
        }
        other => Err(EvalError::TypeMismatch { expected: "array, object or string".into(), got: other.type_name().into(), context: "index".into() }),
    }
}

fn expect_string_key(v: &Value) -> Result<String, EvalError> {
    match v.deref() {
        Value::Str(s) => Ok(String::from_utf8_lossy(&s).into_owned()),
        other => Err(EvalError::TypeMismatch { expected: "string key".into(), got: other.type_name().into(), context: "index".into() }),
    }
}

fn member_access(t: &Value, name: &str) -> Result<Value, EvalError> {
    match t {
        Value::Object(o) => Ok(o.lock().unwrap().get(name).cloned().unwrap_or(Value::Nil)),
        Value::StdInstance(inst) => {
            if let Some(cell) = inst.fields.lock().unwrap().get(name) {
                return Ok(cell.lock().unwrap().clone());
            }
            if let Some(method) = inst.ty.methods.get(name) {
                return Ok(Value::BoundMethod(Arc::new(BoundMethodData {
                    receiver: t.clone(),
                    method: method.clone(),
                    name: name.to_string(),
                })));
            }
            Err(EvalError::TypeMismatch {
                expected: format!("field or method '{name}'"),
                got: format!("std_instance of '{}'", inst.ty.name),
                context: "member access".into(),
            })
        }
        other => Err(EvalError::TypeMismatch { expected: "object or std_instance".into(), got: other.type_name().into(), context: "member access".into() }),
    }
}

fn assign_to(target: &Expr, value: Value, env: &Env, registry: &Registry) -> Result<(), EvalError> {
    match target {
        Expr::Identifier(name) => env.assign(name, value),
        Expr::Index { target, index } => {
            let container = eval_expr(target, env, registry)?.deref();
            let idx_val = eval_expr(index, env, registry)?;
            match container {
                Value::Array(a) => {
                    let mut items = a.lock().unwrap();
                    let idx = expect_number_value(&idx_val, "index assignment")?.floor() as i64;
                    if idx < 0 || idx as usize >= items.len() {
                        return Err(EvalError::OutOfBounds { index: idx, len: items.len(), context: "index assignment".into() });
                    }
                    items[idx as usize] = value;
                    Ok(())
                }
                Value::Object(o) => {
                    let key = expect_string_key(&idx_val)?;
                    o.lock().unwrap().insert(key, value);
                    Ok(())
                }
                other => Err(EvalError::TypeMismatch { expected: "array or object".into(), got: other.type_name().into(), context: "index assignment".into() }),
            }
        }
        Expr::Member { target, name } => {
            let t = eval_expr(target, env, registry)?.deref();
            match t {
                Value::Object(o) => {
                    o.lock().unwrap().insert(name.clone(), value);
                    Ok(())
                }
                Value::StdInstance(inst) => {
                    let mut fields = inst.fields.lock().unwrap();
                    if let Some(cell) = fields.get(name) {
                        *cell.lock().unwrap() = value;
                    } else {
                        fields.insert(name.clone(), new_cell(value));
                    }
                    Ok(())
                }
                other => Err(EvalError::TypeMismatch { expected: "object or std_instance".into(), got: other.type_name().into(), context: "member assignment".into() }),
            }
        }
        other => Err(EvalError::TypeMismatch { expected: "assignable target".into(), got: format!("{other:?}"), context: "assignment".into() }),
    }
}

fn eval_unary(op: UnaryOp, v: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => Ok(Value::Number(-expect_number_value(v, "unary -")?)),
        UnaryOp::Not => Ok(Value::Bool(!truthy(v))),
    }
}

fn eval_binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, EvalError> {
    use BinaryOp::*;
    let a = a.deref();
    let b = b.deref();
    match op {
        Add => eval_add(&a, &b),
        Sub | Mul | Div | Mod => {
            let x = expect_number_value(&a, "arithmetic")?;
            let y = expect_number_value(&b, "arithmetic")?;
            Ok(Value::Number(match op {
                Sub => x - y,
                Mul => x * y,
                Div => x / y,
                Mod => x % y,
                _ => unreachable!(),
            }))
        }
        Eq => Ok(Value::Bool(equal(&a, &b))),
        NotEq => Ok(Value::Bool(!equal(&a, &b))),
        Lt => Ok(Value::Bool(less(&a, &b))),
        LtEq => Ok(Value::Bool(less(&a, &b) || equal(&a, &b))),
        Gt => Ok(Value::Bool(less(&b, &a))),
        GtEq => Ok(Value::Bool(less(&b, &a) || equal(&a, &b))),
    }
}

/// `+` also concatenates strings (implicit to-string of the other
/// operand when exactly one side is a string) and appends arrays when
/// both sides are arrays (spec.md §4.3).
fn eval_add(a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x + y)),
        (Value::Array(x), Value::Array(y)) => {
            let mut items = x.lock().unwrap().clone();
            items.extend(y.lock().unwrap().clone());
            Ok(Value::array(items))
        }
        (Value::Str(_), _) | (_, Value::Str(_)) => {
            let mut bytes = to_string(a).into_bytes();
            bytes.extend(to_string(b).into_bytes());
            Ok(Value::string(bytes))
        }
        _ => Err(EvalError::TypeMismatch { expected: "numbers, strings or arrays".into(), got: format!("{} + {}", a.type_name(), b.type_name()), context: "+".into() }),
    }
}

/// `call(fn_value, args, env)` (spec.md §4.1): dispatches a closure, a
/// bound method, or a native handler. Arguments are already evaluated.
pub fn call_value(fn_value: &Value, args: &[Value], registry: &Registry) -> Result<Value, EvalError> {
    match fn_value.deref() {
        Value::Function(f) => match &f.body {
            FunctionBody::Native(native) => native(args),
            FunctionBody::Ast(body) => {
                if f.params.len() != args.len() {
                    return Err(EvalError::ArityMismatch { expected: f.params.len(), got: args.len(), context: "function call".into() });
                }
                let child = Scope::child(&f.env);
                for (p, a) in f.params.iter().zip(args) {
                    child.define(p, a.clone());
                }
                match exec_stmts(body, &child, registry)? {
                    Value::ReturnSignal(v) => Ok(*v),
                    Value::BreakSignal | Value::ContinueSignal => Ok(Value::Nil),
                    other => Ok(other),
                }
            }
        },
        Value::BoundMethod(m) => (m.method)(&m.receiver, args),
        other => Err(EvalError::NotCallable(other.type_name().to_string())),
    }
}

/// `ref(x)`: wraps `x` in a fresh cell, or returns `x` unchanged if
/// it is already a reference (spec.md §8's idempotence property).
pub fn builtin_ref(args: &[Value]) -> Result<Value, EvalError> {
    crate::util::expect_arity(args, 1, "ref")?;
    match &args[0] {
        Value::Reference(_) => Ok(args[0].clone()),
        other => Ok(Value::reference(new_cell(other.clone()))),
    }
}

/// `len(c)`: arrays/objects/strings by their own length; any
/// `std_instance` via its `size` method (spec.md §8's `len` agreement
/// property, and §4.5's "evaluator's foreach and len builtins hook
/// into items/size").
pub fn builtin_len(args: &[Value]) -> Result<Value, EvalError> {
    crate::util::expect_arity(args, 1, "len")?;
    match args[0].deref() {
        Value::Array(a) => Ok(Value::Number(a.lock().unwrap().len() as f64)),
        Value::Object(o) => Ok(Value::Number(o.lock().unwrap().len() as f64)),
        Value::Str(s) => Ok(Value::Number(s.len() as f64)),
        Value::StdInstance(inst) => {
            let size_method = inst.ty.methods.get("size").ok_or_else(|| EvalError::TypeMismatch {
                expected: "a container with a size method".into(),
                got: format!("std_instance of '{}'", inst.ty.name),
                context: "len".into(),
            })?;
            size_method(&args[0], &[])
        }
        other => Err(EvalError::TypeMismatch { expected: "array, object, string or container".into(), got: other.type_name().into(), context: "len".into() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::Writers;
    use zima_lang::parse;

    fn run(source: &str) -> Result<Value, EvalError> {
        let program = parse(source).expect("parses");
        let registry = Registry::new(Writers::stdio());
        let root = Scope::root();
        crate::install_globals(&root, &registry);
        eval_program(&program, &root, &registry)
    }

    #[test]
    fn arithmetic_and_let_bindings() {
        let v = run("let x = 1 + 2 * 3; x").unwrap();
        assert_eq!(v, Value::Number(7.0));
    }

    #[test]
    fn string_concatenation_with_plus() {
        let v = run(r#"let x = "a" + "b"; x"#).unwrap();
        assert_eq!(v, Value::string("ab"));
    }

    #[test]
    fn range_is_half_open() {
        let v = run("let x = 1..4; x").unwrap();
        assert_eq!(v, Value::array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]));
    }

    #[test]
    fn foreach_sums_array() {
        let v = run(
            "let total = 0; foreach x in [1, 2, 3] { total = total + x; } total",
        )
        .unwrap();
        assert_eq!(v, Value::Number(6.0));
    }

    #[test]
    fn closures_capture_environment_by_reference() {
        let v = run(
            "let x = 1; function make() { return function() { return x; }; } let f = make(); x = 99; f()",
        )
        .unwrap();
        assert_eq!(v, Value::Number(99.0));
    }

    #[test]
    fn break_and_continue_affect_loop() {
        let v = run(
            "let total = 0; let i = 0; while i < 5 { i = i + 1; if i == 2 { continue; } if i == 4 { break; } total = total + i; } total",
        )
        .unwrap();
        assert_eq!(v, Value::Number(1.0 + 3.0));
    }

    #[test]
    fn ref_is_idempotent() {
        let x = Value::Number(4.0);
        let r1 = builtin_ref(&[x.clone()]).unwrap();
        let r2 = builtin_ref(&[r1.clone()]).unwrap();
        assert_eq!(r1, r2);
    }
}
