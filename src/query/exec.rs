//! Pure transformations over a slice of books.
//!
//! Every function here returns a fresh `Vec` and leaves its input untouched, so calls
//! compose the way a `find().sort().skip().limit()` chain would.

use crate::book::{Book, PartialBook};
use crate::errors::Result;
use crate::types::{BookField, Order};
use bson::Bson;
use std::cmp::Ordering;
use std::ops::Bound;

use super::eval::{compare_values, eval_all, in_range, values_equal};
use super::types::{Predicate, SortSpec};

/// Equality filter keeping the original relative order.
///
/// # Errors
/// Returns `CatalogError::InvalidField` for unknown field names.
pub fn filter_by_field(records: &[Book], field: &str, value: &Bson) -> Result<Vec<Book>> {
    let f: BookField = field.parse()?;
    Ok(records.iter().filter(|b| values_equal(&b.get(f), value)).cloned().collect())
}

/// Range filter; either bound may be `Unbounded`.
///
/// # Errors
/// Returns `CatalogError::InvalidField` for unknown field names.
pub fn filter_by_range(records: &[Book], field: &str, min: Bound<&Bson>, max: Bound<&Bson>) -> Result<Vec<Book>> {
    let f: BookField = field.parse()?;
    Ok(records.iter().filter(|b| in_range(&b.get(f), min, max)).cloned().collect())
}

/// Logical AND of all predicates.
#[must_use]
pub fn filter_combined(records: &[Book], preds: &[Predicate]) -> Vec<Book> {
    records.iter().filter(|b| eval_all(b, preds)).cloned().collect()
}

/// Keeps only the named fields, in the order given. Duplicate names are collapsed.
///
/// # Errors
/// Returns `CatalogError::InvalidField` if any name is not a book field.
pub fn project<S: AsRef<str>>(records: &[Book], fields: &[S]) -> Result<Vec<PartialBook>> {
    let mut parsed: Vec<BookField> = Vec::with_capacity(fields.len());
    for name in fields {
        let f: BookField = name.as_ref().parse()?;
        if !parsed.contains(&f) {
            parsed.push(f);
        }
    }
    Ok(records
        .iter()
        .map(|b| {
            let mut out = PartialBook::new();
            for f in &parsed {
                out.insert(f.name(), b.get(*f));
            }
            out
        })
        .collect())
}

/// Stable single-key sort; ties keep input order in both directions.
///
/// # Errors
/// Returns `CatalogError::InvalidField` for unknown field names.
pub fn sort_by(records: &[Book], field: &str, order: Order) -> Result<Vec<Book>> {
    let spec = SortSpec { field: field.parse()?, order };
    Ok(sort_by_specs(records, &[spec]))
}

/// Stable multi-key sort, first spec most significant.
#[must_use]
pub fn sort_by_specs(records: &[Book], specs: &[SortSpec]) -> Vec<Book> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| compare_books(a, b, specs));
    out
}

fn compare_books(a: &Book, b: &Book, specs: &[SortSpec]) -> Ordering {
    for s in specs {
        let ord = total_order(&a.get(s.field), &b.get(s.field));
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

/// Comparator for sorting. Doubles fall back to `total_cmp` where `partial_cmp` has no
/// answer, so a NaN sorts to one end instead of breaking the order.
pub(crate) fn total_order(a: &Bson, b: &Bson) -> Ordering {
    match (a, b) {
        (Bson::Double(x), Bson::Double(y)) => x.partial_cmp(y).unwrap_or_else(|| x.total_cmp(y)),
        _ => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

/// `records[page_index * page_size .. +page_size]`, empty when out of range or `page_size == 0`.
#[must_use]
pub fn paginate(records: &[Book], page_size: usize, page_index: usize) -> Vec<Book> {
    if page_size == 0 {
        return Vec::new();
    }
    let Some(start) = page_index.checked_mul(page_size) else { return Vec::new() };
    if start >= records.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(records.len());
    records[start..end].to_vec()
}

/// Sort then truncate to `n`.
///
/// # Errors
/// Returns `CatalogError::InvalidField` for unknown field names.
pub fn top_n(records: &[Book], field: &str, order: Order, n: usize) -> Result<Vec<Book>> {
    let mut sorted = sort_by(records, field, order)?;
    sorted.truncate(n);
    Ok(sorted)
}
