//! `time` module: wall-clock and monotonic timing, plus the only two
//! blocking-sleep builtins named in spec.md §5's suspension-points
//! list.

use super::{module, native_fn};
use crate::util::{expect_arity, expect_number};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use zima_core::error::EvalError;
use zima_core::value::Value;

fn process_start() -> Instant {
    static START: OnceLock<Instant> = OnceLock::new();
    *START.get_or_init(Instant::now)
}

pub fn build() -> Value {
    module(vec![
        ("now", native_fn(now)),
        ("now_ms", native_fn(now_ms)),
        ("sleep", native_fn(sleep)),
        ("sleep_ms", native_fn(sleep_ms)),
        ("monotonic_ns", native_fn(monotonic_ns)),
    ])
}

fn now(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 0, "time.now")?;
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64();
    Ok(Value::Number(secs))
}

fn now_ms(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 0, "time.now_ms")?;
    let ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as f64;
    Ok(Value::Number(ms))
}

fn sleep(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "time.sleep")?;
    let secs = expect_number(&args[0], "time.sleep")?;
    if secs > 0.0 {
        std::thread::sleep(Duration::from_secs_f64(secs));
    }
    Ok(Value::Nil)
}

fn sleep_ms(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "time.sleep_ms")?;
    let ms = expect_number(&args[0], "time.sleep_ms")?;
    if ms > 0.0 {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
    Ok(Value::Nil)
}

fn monotonic_ns(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 0, "time.monotonic_ns")?;
    Ok(Value::Number(process_start().elapsed().as_nanos() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_ns_is_nondecreasing() {
        let a = monotonic_ns(&[]).unwrap();
        let b = monotonic_ns(&[]).unwrap();
        assert!(matches!((a, b), (Value::Number(x), Value::Number(y)) if y >= x));
    }
}
