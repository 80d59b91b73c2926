use crate::book::Book;
use crate::errors::{CatalogError, Result};
use crate::query::{exact_i64, to_f64};
use crate::types::{BookField, FieldKind, Order, RecordId};
use bson::Bson;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct IndexStats {
    pub keys: usize,
    pub entries: usize,
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub build_time_ms: u128,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatsSnapshot {
    pub keys: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub build_time_ms: u128,
}

impl IndexStats {
    #[must_use]
    pub fn snapshot(&self) -> IndexStatsSnapshot {
        IndexStatsSnapshot {
            keys: self.keys,
            entries: self.entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            build_time_ms: self.build_time_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKeyKind {
    Str(String),
    F64(OrderedFloat<f64>),
    I64(i64),
    Bool(bool),
}

impl IndexKeyKind {
    #[must_use]
    pub fn from_bson(v: &Bson) -> Option<Self> {
        match v {
            Bson::String(s) => Some(Self::Str(s.clone())),
            Bson::Int32(i) => Some(Self::I64(i64::from(*i))),
            Bson::Int64(i) => Some(Self::I64(*i)),
            Bson::Double(f) => Some(Self::F64(OrderedFloat(*f))),
            Bson::Boolean(b) => Some(Self::Bool(*b)),
            _ => None,
        }
    }
}

/// Key a probe value would have if stored in `field`. `None` means no stored value of
/// that field can compare equal to it, so a lookup is an empty hit rather than a miss.
#[allow(clippy::cast_precision_loss)]
fn probe_key(field: BookField, v: &Bson) -> Option<IndexKeyKind> {
    match field.kind() {
        FieldKind::Text | FieldKind::Boolean => match v {
            Bson::String(_) | Bson::Boolean(_) => IndexKeyKind::from_bson(v),
            _ => None,
        },
        FieldKind::Decimal => match v {
            // only integers that survive the trip through f64 can equal a stored price
            Bson::Int64(i) => {
                let f = *i as f64;
                (exact_i64(f) == Some(*i)).then_some(IndexKeyKind::F64(OrderedFloat(f)))
            }
            Bson::Double(f) if f.is_nan() => None,
            _ => to_f64(v).map(|f| IndexKeyKind::F64(OrderedFloat(f))),
        },
        FieldKind::Integer => match v {
            Bson::Int32(_) | Bson::Int64(_) => IndexKeyKind::from_bson(v),
            Bson::Double(f) => exact_i64(*f).map(IndexKeyKind::I64),
            _ => None,
        },
    }
}

/// Public description of a registered index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHandle {
    pub name: String,
    pub fields: Vec<(BookField, Order)>,
}

impl IndexHandle {
    /// # Errors
    /// `CatalogError::InvalidField` for unknown names, `CatalogError::Query` for an empty
    /// or repeating field list.
    pub fn from_spec(fields: &[(&str, Order)]) -> Result<Self> {
        if fields.is_empty() {
            return Err(CatalogError::Query("index needs at least one field".into()));
        }
        let mut parsed: Vec<(BookField, Order)> = Vec::with_capacity(fields.len());
        for (name, order) in fields {
            let f: BookField = name.parse()?;
            if parsed.iter().any(|(p, _)| *p == f) {
                return Err(CatalogError::Query(format!("field {f} repeated in index")));
            }
            parsed.push((f, *order));
        }
        let name = parsed
            .iter()
            .map(|(f, o)| format!("{}_{}", f.name(), o.as_i32()))
            .collect::<Vec<_>>()
            .join("_");
        Ok(Self { name, fields: parsed })
    }

    #[must_use]
    pub fn leading_field(&self) -> BookField {
        self.fields[0].0
    }
}

#[derive(Debug)]
pub struct OrderedIndex {
    pub handle: IndexHandle,
    pub map: BTreeMap<Vec<IndexKeyKind>, BTreeSet<RecordId>>,
    pub stats: IndexStats,
}

impl OrderedIndex {
    #[must_use]
    pub fn new(handle: IndexHandle) -> Self {
        Self { handle, map: BTreeMap::new(), stats: IndexStats::default() }
    }

    fn key_of(&self, book: &Book) -> Option<Vec<IndexKeyKind>> {
        self.handle.fields.iter().map(|(f, _)| IndexKeyKind::from_bson(&book.get(*f))).collect()
    }

    pub fn insert(&mut self, book: &Book, id: RecordId) {
        if let Some(k) = self.key_of(book) {
            if self.map.entry(k).or_default().insert(id) {
                self.stats.entries += 1;
            }
            self.stats.keys = self.map.len();
        }
    }

    pub fn remove(&mut self, book: &Book, id: RecordId) {
        if let Some(k) = self.key_of(book)
            && let Some(set) = self.map.get_mut(&k)
        {
            if set.remove(&id) {
                self.stats.entries = self.stats.entries.saturating_sub(1);
            }
            if set.is_empty() {
                self.map.remove(&k);
            }
            self.stats.keys = self.map.len();
        }
    }

    /// Equality on the leading field. Returns ids in insertion order plus the number of
    /// index keys examined.
    pub fn lookup_leading_eq(&self, v: &Bson) -> (Vec<RecordId>, usize) {
        let Some(k) = probe_key(self.handle.leading_field(), v) else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return (Vec::new(), 0);
        };
        let mut ids = BTreeSet::new();
        let mut keys_examined = 0usize;
        let start = vec![k.clone()];
        for (_, set) in self.map.range(start..).take_while(|(key, _)| key.first() == Some(&k)) {
            keys_examined += 1;
            ids.extend(set.iter().copied());
        }
        if ids.is_empty() {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        }
        (ids.into_iter().collect(), keys_examined)
    }

    /// All ids ordered by the leading key in `order`; equal keys keep insertion order.
    #[must_use]
    pub fn ordered_ids(&self, order: Order) -> Vec<RecordId> {
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        let mut out = Vec::with_capacity(self.stats.entries);
        match order {
            Order::Asc => self.map.values().for_each(|set| out.extend(set.iter().copied())),
            Order::Desc => self.map.values().rev().for_each(|set| out.extend(set.iter().copied())),
        }
        out
    }
}

/// Registry of indexes for one catalog, in creation order.
#[derive(Debug, Default)]
pub struct IndexManager {
    pub indexes: Vec<OrderedIndex>,
}

impl IndexManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` and builds it from `records`. An index with the same name is
    /// kept as is; the return flag tells whether a new index was built.
    pub fn create<'a>(&mut self, handle: IndexHandle, records: impl Iterator<Item = (RecordId, &'a Book)>) -> bool {
        if self.get(&handle.name).is_some() {
            return false;
        }
        let start = std::time::Instant::now();
        let mut idx = OrderedIndex::new(handle);
        for (id, book) in records {
            idx.insert(book, id);
        }
        idx.stats.build_time_ms = start.elapsed().as_millis();
        self.indexes.push(idx);
        true
    }

    pub fn drop_index(&mut self, name: &str) -> bool {
        let before = self.indexes.len();
        self.indexes.retain(|i| i.handle.name != name);
        before != self.indexes.len()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OrderedIndex> {
        self.indexes.iter().find(|i| i.handle.name == name)
    }

    #[must_use]
    pub fn handles(&self) -> Vec<IndexHandle> {
        self.indexes.iter().map(|i| i.handle.clone()).collect()
    }

    /// Best index for an equality probe on `field`: a single-field index first, else the
    /// narrowest compound index leading with it.
    #[must_use]
    pub fn for_eq(&self, field: BookField) -> Option<&OrderedIndex> {
        self.indexes
            .iter()
            .filter(|i| i.handle.leading_field() == field)
            .min_by_key(|i| i.handle.fields.len())
    }

    /// A single-field index on `field`, usable to produce a full ordering.
    #[must_use]
    pub fn for_sort(&self, field: BookField) -> Option<&OrderedIndex> {
        self.indexes.iter().find(|i| i.handle.fields.len() == 1 && i.handle.leading_field() == field)
    }

    pub fn insert_all(&mut self, book: &Book, id: RecordId) {
        for idx in &mut self.indexes {
            idx.insert(book, id);
        }
    }

    pub fn remove_all(&mut self, book: &Book, id: RecordId) {
        for idx in &mut self.indexes {
            idx.remove(book, id);
        }
    }
}
