//! `random` module: seedable pseudo-randomness via `rand` (same crate
//! the heap/treap tie-break priorities use — spec.md §4.5's treap
//! entry is "heap by random priority").

use super::{module, native_fn};
use crate::util::{expect_array, expect_arity, expect_number};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use zima_core::error::EvalError;
use zima_core::value::Value;

static RNG: Mutex<Option<StdRng>> = Mutex::new(None);

fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    let mut guard = RNG.lock().unwrap();
    let rng = guard.get_or_insert_with(|| StdRng::from_entropy());
    f(rng)
}

pub fn build() -> Value {
    module(vec![
        ("seed", native_fn(seed)),
        ("float", native_fn(float)),
        ("int", native_fn(int)),
        ("choice", native_fn(choice)),
        ("shuffle", native_fn(shuffle)),
    ])
}

fn seed(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "random.seed")?;
    let n = expect_number(&args[0], "random.seed")? as u64;
    *RNG.lock().unwrap() = Some(StdRng::seed_from_u64(n));
    Ok(Value::Nil)
}

fn float(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 0, "random.float")?;
    Ok(Value::Number(with_rng(|rng| rng.gen::<f64>())))
}

fn int(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 2, "random.int")?;
    let min = expect_number(&args[0], "random.int")?.floor() as i64;
    let max = expect_number(&args[1], "random.int")?.floor() as i64;
    if min > max {
        return Err(EvalError::TypeMismatch {
            expected: "min <= max".into(),
            got: format!("{min} > {max}"),
            context: "random.int".into(),
        });
    }
    Ok(Value::Number(with_rng(|rng| rng.gen_range(min..=max)) as f64))
}

fn choice(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity(args, 1, "random.choice")?;
    let items = expect_array(&args[0], "random.choice")?;
    if items.is_empty() {
        return Err(EvalError::OutOfBounds { index: 0, len: 0, context: "random.choice".into() });
    }
    let idx = with_rng(|rng| rng.gen_range(0..items.len()));
    Ok(items[idx].clone())
}

fn shuffle(args: &[Value]) -> Result<Value, EvalError> {
    use rand::seq::SliceRandom;
    expect_arity(args, 1, "random.shuffle")?;
    let mut items = expect_array(&args[0], "random.shuffle")?;
    with_rng(|rng| items.shuffle(rng));
    Ok(Value::array(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_int_is_deterministic() {
        seed(&[Value::Number(42.0)]).unwrap();
        let a = int(&[Value::Number(0.0), Value::Number(100.0)]).unwrap();
        seed(&[Value::Number(42.0)]).unwrap();
        let b = int(&[Value::Number(0.0), Value::Number(100.0)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn choice_on_empty_array_fails() {
        assert!(choice(&[Value::array(vec![])]).is_err());
    }
}
