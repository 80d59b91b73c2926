use crate::book::Book;
use crate::errors::Result;
use crate::index::IndexManager;
use crate::query::values_equal;
use crate::types::{BookField, RecordId};
use bson::Bson;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Records and indexes, guarded together so a write is never half-visible.
#[derive(Debug, Default)]
pub(crate) struct CatalogState {
    pub(crate) records: BTreeMap<RecordId, Book>,
    pub(crate) indexes: IndexManager,
    next_id: u64,
}

impl CatalogState {
    pub(crate) fn push(&mut self, book: Book) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.indexes.insert_all(&book, id);
        self.records.insert(id, book);
        id
    }

    /// Id of the first record (insertion order) whose `field` equals `value`.
    pub(crate) fn first_match(&self, field: BookField, value: &Bson) -> Option<RecordId> {
        if let Some(idx) = self.indexes.for_eq(field) {
            return idx.lookup_leading_eq(value).0.first().copied();
        }
        self.records.iter().find(|(_, b)| values_equal(&b.get(field), value)).map(|(id, _)| *id)
    }

    pub(crate) fn books(&self) -> Vec<Book> {
        self.records.values().cloned().collect()
    }
}

/// The in-memory record set of books plus the fixed operations run against it.
///
/// Reads share the lock; `insert_one`, `update_one`, `delete_one` and index
/// administration take it exclusively.
#[derive(Debug)]
pub struct QueryCatalog {
    name: String,
    pub(crate) state: RwLock<CatalogState>,
}

impl QueryCatalog {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), state: RwLock::new(CatalogState::default()) }
    }

    /// Builds a catalog already holding `books`, in order.
    ///
    /// # Errors
    /// Returns `CatalogError::Validation` for the first book failing [`Book::validate`];
    /// no catalog is built in that case.
    pub fn with_books(name: impl Into<String>, books: impl IntoIterator<Item = Book>) -> Result<Self> {
        let catalog = Self::new(name);
        {
            let mut st = catalog.state.write();
            for b in books {
                b.validate()?;
                st.push(b);
            }
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Copy of every record in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Book> {
        self.state.read().books()
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<Book> {
        self.state.read().records.get(&id).cloned()
    }
}
