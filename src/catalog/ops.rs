use super::state::QueryCatalog;
use crate::book::Book;
use crate::errors::{CatalogError, Result};
use crate::query::Patch;
use crate::query::telemetry;
use crate::types::{BookField, RecordId};
use bson::{Bson, Document as BsonDocument};

impl QueryCatalog {
    /// Validates `document` and appends it.
    ///
    /// # Errors
    /// Returns `CatalogError::Validation` when a required field is absent or mistyped.
    pub fn insert_one(&self, document: &BsonDocument) -> Result<RecordId> {
        let book = Book::from_document(document).inspect_err(|e| log::warn!("insert rejected: {e}"))?;
        self.insert_book(book)
    }

    /// Appends an already typed book.
    ///
    /// # Errors
    /// Returns `CatalogError::Validation` when [`Book::validate`] fails.
    pub fn insert_book(&self, book: Book) -> Result<RecordId> {
        book.validate().inspect_err(|e| log::warn!("insert rejected: {e}"))?;
        let title = book.title.clone();
        let id = self.state.write().push(book);
        telemetry::log_audit("insert", &title, true);
        Ok(id)
    }

    /// Applies `patch` to the first record whose `field` equals `value`.
    ///
    /// The patch is applied to a copy and committed only if every entry is valid, so a
    /// failing patch leaves the record untouched. Returns `false` when nothing matched.
    ///
    /// # Errors
    /// `CatalogError::InvalidField` for an unknown `field`, `CatalogError::Validation` for a
    /// patch value of the wrong type.
    pub fn update_one(&self, field: &str, value: &Bson, patch: &Patch) -> Result<bool> {
        let f: BookField = field.parse()?;
        let mut st = self.state.write();
        let Some(id) = st.first_match(f, value) else {
            drop(st);
            telemetry::log_audit("update", &display_key(value), false);
            return Ok(false);
        };
        let Some(old) = st.records.get(&id).cloned() else {
            return Err(CatalogError::Query(format!("record {id} vanished during update")));
        };
        let mut new = old.clone();
        for (pf, pv) in &patch.set {
            new.set_field(*pf, pv)?;
        }
        for (pf, delta) in &patch.inc {
            new.increment(*pf, *delta)?;
        }
        st.indexes.remove_all(&old, id);
        st.indexes.insert_all(&new, id);
        st.records.insert(id, new);
        drop(st);
        telemetry::log_audit("update", &display_key(value), true);
        Ok(true)
    }

    /// Removes the first record whose `field` equals `value`. Returns `false` when nothing matched.
    ///
    /// # Errors
    /// `CatalogError::InvalidField` for an unknown `field`.
    pub fn delete_one(&self, field: &str, value: &Bson) -> Result<bool> {
        let f: BookField = field.parse()?;
        let mut st = self.state.write();
        let target = st.first_match(f, value);
        let removed = target.and_then(|id| st.records.remove(&id).map(|b| (id, b)));
        if let Some((id, book)) = &removed {
            st.indexes.remove_all(book, *id);
        }
        drop(st);
        telemetry::log_audit("delete", &display_key(value), removed.is_some());
        Ok(removed.is_some())
    }
}

fn display_key(v: &Bson) -> String {
    match v {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
