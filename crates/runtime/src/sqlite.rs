//! `sqlite` native type: a thin wrapper over `rusqlite` (spec.md §6/§7
//! name this type and its dedicated error kinds explicitly). Native
//! `std_instance` resource: the connection is released on `close()`,
//! with double-release documented as a no-op (spec.md §5).

use crate::containers::{downcast, make_instance};
use crate::util::{bytes_to_string, expect_arity, expect_array, expect_string};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use zima_core::error::EvalError;
use zima_core::value::{NativeFn, NativeMethod, OrderedMap, StdStructDef, Value};

pub struct SqliteData {
    conn: Mutex<Option<Connection>>,
}

fn bind_param(v: &Value) -> Result<rusqlite::types::Value, EvalError> {
    use rusqlite::types::Value as SqlValue;
    match v.deref() {
        Value::Nil => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(b as i64)),
        Value::Number(n) => Ok(SqlValue::Real(n)),
        Value::Str(s) => Ok(SqlValue::Text(bytes_to_string((*s).clone()))),
        other => Err(EvalError::UnsupportedBindValue(other.type_name().to_string())),
    }
}

fn column_value(row: &rusqlite::Row, idx: usize) -> Result<Value, EvalError> {
    let value_ref = row.get_ref(idx).map_err(|e| EvalError::SqliteStepFailed(e.to_string()))?;
    match value_ref {
        ValueRef::Null => Ok(Value::Nil),
        ValueRef::Integer(i) => Ok(Value::Number(i as f64)),
        ValueRef::Real(f) => Ok(Value::Number(f)),
        ValueRef::Text(t) => Ok(Value::string(t.to_vec())),
        ValueRef::Blob(b) => Ok(Value::string(b.to_vec())),
    }
}

fn params_of(args: &[Value], idx: usize, ctx: &str) -> Result<Vec<rusqlite::types::Value>, EvalError> {
    match args.get(idx) {
        None => Ok(Vec::new()),
        Some(v) => expect_array(v, ctx)?.iter().map(bind_param).collect(),
    }
}

pub fn type_def() -> Arc<StdStructDef> {
    Arc::new_cyclic(|weak: &Weak<StdStructDef>| {
        let ty = weak.clone();
        let constructor: NativeFn = Arc::new(move |args| {
            expect_arity(args, 1, "sqlite constructor")?;
            let path = bytes_to_string(expect_string(&args[0], "sqlite constructor")?);
            let conn = Connection::open(&path).map_err(|e| EvalError::SqliteOpenFailed(e.to_string()))?;
            let ty = ty.upgrade().expect("sqlite type registered");
            Ok(make_instance(ty, SqliteData { conn: Mutex::new(Some(conn)) }))
        });

        let mut methods: HashMap<String, NativeMethod> = HashMap::new();

        methods.insert("exec".to_string(), Arc::new(|recv, args| {
            if args.is_empty() || args.len() > 2 {
                return Err(EvalError::ArityMismatch { expected: 1, got: args.len(), context: "sqlite.exec".into() });
            }
            let data = downcast::<SqliteData>(recv, "sqlite")?;
            let sql = bytes_to_string(expect_string(&args[0], "sqlite.exec")?);
            let params = params_of(args, 1, "sqlite.exec")?;
            let guard = data.conn.lock().unwrap();
            let conn = guard.as_ref().ok_or_else(|| EvalError::SqliteExecFailed("connection closed".into()))?;
            let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
            let affected = conn.execute(&sql, param_refs.as_slice()).map_err(|e| EvalError::SqliteExecFailed(e.to_string()))?;
            Ok(Value::Number(affected as f64))
        }));

        methods.insert("query".to_string(), Arc::new(|recv, args| {
            if args.is_empty() || args.len() > 2 {
                return Err(EvalError::ArityMismatch { expected: 1, got: args.len(), context: "sqlite.query".into() });
            }
            let data = downcast::<SqliteData>(recv, "sqlite")?;
            let sql = bytes_to_string(expect_string(&args[0], "sqlite.query")?);
            let params = params_of(args, 1, "sqlite.query")?;
            let guard = data.conn.lock().unwrap();
            let conn = guard.as_ref().ok_or_else(|| EvalError::SqlitePrepareFailed("connection closed".into()))?;
            let mut stmt = conn.prepare(&sql).map_err(|e| EvalError::SqlitePrepareFailed(e.to_string()))?;
            let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
            let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
            let mut rows = stmt.query(param_refs.as_slice()).map_err(|e| EvalError::SqliteStepFailed(e.to_string()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next().map_err(|e| EvalError::SqliteStepFailed(e.to_string()))? {
                let mut map = OrderedMap::new();
                for (i, name) in column_names.iter().enumerate() {
                    map.insert(name.clone(), column_value(row, i)?);
                }
                out.push(Value::object(map));
            }
            Ok(Value::array(out))
        }));

        methods.insert("close".to_string(), Arc::new(|recv, args| {
            expect_arity(args, 0, "sqlite.close")?;
            let data = downcast::<SqliteData>(recv, "sqlite")?;
            data.conn.lock().unwrap().take();
            Ok(Value::Nil)
        }));

        StdStructDef { name: "sqlite".to_string(), constructor, methods }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_then_query_round_trips() {
        let ty = type_def();
        let db = (ty.constructor)(&[Value::string(":memory:")]).unwrap();
        (ty.methods["exec"])(&db, &[Value::string("create table t (id integer, name text)")]).unwrap();
        (ty.methods["exec"])(&db, &[Value::string("insert into t (id, name) values (1, 'a')")]).unwrap();
        let rows = (ty.methods["query"])(&db, &[Value::string("select id, name from t")]).unwrap();
        match rows {
            Value::Array(items) => assert_eq!(items.lock().unwrap().len(), 1),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn close_is_idempotent() {
        let ty = type_def();
        let db = (ty.constructor)(&[Value::string(":memory:")]).unwrap();
        (ty.methods["close"])(&db, &[]).unwrap();
        (ty.methods["close"])(&db, &[]).unwrap();
    }
}
