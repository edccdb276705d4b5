//! Structural equality for JSON values.

use serde_json::{Number, Value};

/// `true` when `a` and `b` hold the same data.
///
/// Objects are compared by key set and per-key value, ignoring key order.
/// Arrays are compared element by element. Numbers are compared by numeric
/// value, so `1` and `1.0` are equal.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, l)| y.get(k).map_or(false, |r| deep_equal(l, r)))
        }
        _ => false,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(l), Some(r)) = (x.as_i64(), y.as_i64()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (x.as_u64(), y.as_u64()) {
        return l == r;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}
