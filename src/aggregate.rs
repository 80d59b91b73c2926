//! Group-by aggregation: count and optional average per group.

use crate::book::Book;
use crate::errors::{CatalogError, Result};
use crate::index::IndexKeyKind;
use crate::query::{to_f64, total_order};
use crate::types::BookField;
use crate::utils::num::decade_of;
use bson::{Bson, Document as BsonDocument};
use std::collections::HashMap;

/// What a group is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Field(BookField),
    /// `floor(published_year / 10) * 10`
    Decade,
}

impl GroupKey {
    /// Accepts any book field name or `decade`.
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidField` otherwise.
    pub fn parse(name: &str) -> Result<Self> {
        if name == "decade" {
            return Ok(Self::Decade);
        }
        Ok(Self::Field(name.parse()?))
    }

    #[must_use]
    pub fn key_of(self, book: &Book) -> Bson {
        match self {
            Self::Field(f) => book.get(f),
            Self::Decade => Bson::Int64(decade_of(book.published_year)),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Field(f) => f.name(),
            Self::Decade => "decade",
        }
    }
}

/// Row order of an aggregation result. Ties always keep first-seen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    FirstSeen,
    KeyAsc,
    CountDesc,
    AvgDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Bson,
    pub count: usize,
    pub avg: Option<f64>,
}

impl GroupRow {
    /// `{"_id": key, "count": n}` plus `"average_<field>"` when an average was computed.
    #[must_use]
    pub fn to_document(&self, avg_field: Option<BookField>) -> BsonDocument {
        self.to_document_labeled(avg_field, "count")
    }

    /// Same as [`GroupRow::to_document`] with the count stored under `count_label`.
    #[must_use]
    pub fn to_document_labeled(&self, avg_field: Option<BookField>, count_label: &str) -> BsonDocument {
        let mut d = BsonDocument::new();
        d.insert("_id", self.key.clone());
        d.insert(count_label, i64::try_from(self.count).unwrap_or(i64::MAX));
        if let (Some(f), Some(avg)) = (avg_field, self.avg) {
            d.insert(format!("average_{}", f.name()), avg);
        }
        d
    }
}

/// Groups `records` by `key`, counting members and averaging `avg_field` when given.
///
/// # Errors
/// `CatalogError::InvalidField` for an unknown key/average field or a non-numeric average
/// field; `CatalogError::Query` for `GroupOrder::AvgDesc` without an average field.
pub fn group_by(records: &[Book], key: &str, avg_field: Option<&str>, order: GroupOrder) -> Result<Vec<GroupRow>> {
    let key = GroupKey::parse(key)?;
    let avg = avg_field.map(parse_numeric_field).transpose()?;
    group_by_key(records, key, avg, order)
}

/// Typed form of [`group_by`].
///
/// # Errors
/// `CatalogError::Query` for `GroupOrder::AvgDesc` without an average field, and
/// `CatalogError::InvalidField` for a non-numeric average field.
pub fn group_by_key(records: &[Book], key: GroupKey, avg_field: Option<BookField>, order: GroupOrder) -> Result<Vec<GroupRow>> {
    if let Some(f) = avg_field
        && !f.kind().is_numeric()
    {
        return Err(CatalogError::InvalidField(format!("{f} is not numeric")));
    }
    if order == GroupOrder::AvgDesc && avg_field.is_none() {
        return Err(CatalogError::Query("ordering by average needs an average field".into()));
    }
    Ok(group_by_with(records, |b| key.key_of(b), avg_field, order))
}

/// Groups by an arbitrary key function.
#[must_use]
pub fn group_by_with<F>(records: &[Book], key_fn: F, avg_field: Option<BookField>, order: GroupOrder) -> Vec<GroupRow>
where
    F: Fn(&Book) -> Bson,
{
    // (key, count, sum)
    let mut acc: Vec<(Bson, usize, f64)> = Vec::new();
    let mut slots: HashMap<IndexKeyKind, usize> = HashMap::new();
    for b in records {
        let k = key_fn(b);
        let add = avg_field.and_then(|f| to_f64(&b.get(f))).unwrap_or(0.0);
        let slot = match IndexKeyKind::from_bson(&k) {
            Some(hk) => *slots.entry(hk).or_insert_with(|| {
                acc.push((k.clone(), 0, 0.0));
                acc.len() - 1
            }),
            None => acc.iter().position(|(existing, _, _)| *existing == k).unwrap_or_else(|| {
                acc.push((k.clone(), 0, 0.0));
                acc.len() - 1
            }),
        };
        acc[slot].1 += 1;
        acc[slot].2 += add;
    }
    #[allow(clippy::cast_precision_loss)]
    let mut rows: Vec<GroupRow> = acc
        .into_iter()
        .map(|(key, count, sum)| GroupRow { key, count, avg: avg_field.map(|_| sum / count as f64) })
        .collect();
    match order {
        GroupOrder::FirstSeen => {}
        GroupOrder::KeyAsc => rows.sort_by(|a, b| total_order(&a.key, &b.key)),
        GroupOrder::CountDesc => rows.sort_by(|a, b| b.count.cmp(&a.count)),
        GroupOrder::AvgDesc => rows.sort_by(|a, b| {
            let (x, y) = (a.avg.unwrap_or(f64::NEG_INFINITY), b.avg.unwrap_or(f64::NEG_INFINITY));
            y.partial_cmp(&x).unwrap_or_else(|| y.total_cmp(&x))
        }),
    }
    rows
}

fn parse_numeric_field(name: &str) -> Result<BookField> {
    let f: BookField = name.parse()?;
    if f.kind().is_numeric() { Ok(f) } else { Err(CatalogError::InvalidField(format!("{f} is not numeric"))) }
}
