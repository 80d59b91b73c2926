use crate::book::Book;
use bson::Bson;
use std::cmp::Ordering;
use std::ops::Bound;

use super::types::{CmpOp, Predicate};

#[must_use]
pub fn eval_predicate(book: &Book, p: &Predicate) -> bool {
    let v = book.get(p.field);
    match p.op {
        CmpOp::Eq => values_equal(&v, &p.value),
        CmpOp::Ne => !values_equal(&v, &p.value),
        CmpOp::Gt => compare_values(&v, &p.value) == Some(Ordering::Greater),
        CmpOp::Gte => compare_values(&v, &p.value).is_some_and(|o| o != Ordering::Less),
        CmpOp::Lt => compare_values(&v, &p.value) == Some(Ordering::Less),
        CmpOp::Lte => compare_values(&v, &p.value).is_some_and(|o| o != Ordering::Greater),
        CmpOp::In => is_in_set(&v, &p.value),
        CmpOp::Nin => !is_in_set(&v, &p.value),
    }
}

/// Logical AND; an empty slice matches everything.
#[must_use]
pub fn eval_all(book: &Book, preds: &[Predicate]) -> bool {
    preds.iter().all(|p| eval_predicate(book, p))
}

fn is_in_set(v: &Bson, set: &Bson) -> bool {
    match set {
        Bson::Array(items) => items.iter().any(|x| values_equal(v, x)),
        single => values_equal(v, single),
    }
}

#[must_use]
pub fn in_range(v: &Bson, min: Bound<&Bson>, max: Bound<&Bson>) -> bool {
    let lower = match min {
        Bound::Unbounded => true,
        Bound::Included(m) => compare_values(v, m).is_some_and(|o| o != Ordering::Less),
        Bound::Excluded(m) => compare_values(v, m) == Some(Ordering::Greater),
    };
    let upper = match max {
        Bound::Unbounded => true,
        Bound::Included(m) => compare_values(v, m).is_some_and(|o| o != Ordering::Greater),
        Bound::Excluded(m) => compare_values(v, m) == Some(Ordering::Less),
    };
    lower && upper
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn to_f64(b: &Bson) -> Option<f64> {
    match b {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

/// The `i64` a double represents exactly, if any. `None` for fractional, non-finite or
/// out-of-range values.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
#[must_use]
pub fn exact_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then(|| f as i64)
}

/// Equality with numeric widening (`Int32(13) == Double(13.0)`). `Int64` against `Double`
/// is exact: no rounding through `f64`.
#[allow(clippy::float_cmp)]
#[must_use]
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (Bson::Int32(x), Bson::Int64(y)) => i64::from(*x) == *y,
        (Bson::Int64(x), Bson::Int32(y)) => *x == i64::from(*y),
        (Bson::Int32(x), Bson::Double(y)) => f64::from(*x) == *y,
        (Bson::Double(x), Bson::Int32(y)) => *x == f64::from(*y),
        (Bson::Int64(x), Bson::Double(y)) | (Bson::Double(y), Bson::Int64(x)) => exact_i64(*y) == Some(*x),
        _ => a == b,
    }
}

/// Ordering between comparable values; `None` across incompatible kinds.
#[must_use]
pub fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Bson::Int64(x), Bson::Int64(y)) = (a, b) {
        return Some(x.cmp(y));
    }
    if let (Some(af), Some(bf)) = (to_f64(a), to_f64(b)) {
        return af.partial_cmp(&bf);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
