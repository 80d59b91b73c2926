use super::state::{CatalogState, QueryCatalog};
use crate::aggregate::{GroupOrder, GroupRow, group_by};
use crate::book::Book;
use crate::errors::Result;
use crate::query::{self, Predicate, telemetry, values_equal};
use crate::types::{BookField, Order};
use bson::Bson;
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use std::time::Instant;

/// Execution statistics for an equality lookup, shaped after Mongo's `executionStats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainReport {
    /// `IXSCAN` when an index served the lookup, `COLLSCAN` otherwise.
    pub stage: String,
    pub index_name: Option<String>,
    pub keys_examined: usize,
    pub docs_examined: usize,
    pub returned: usize,
    pub execution_time_ms: u128,
}

impl CatalogState {
    fn find_eq(&self, field: BookField, value: &Bson) -> (Vec<Book>, ExplainReport) {
        if let Some(idx) = self.indexes.for_eq(field) {
            let (ids, keys_examined) = idx.lookup_leading_eq(value);
            let out: Vec<Book> = ids.iter().filter_map(|id| self.records.get(id)).cloned().collect();
            let report = ExplainReport {
                stage: "IXSCAN".into(),
                index_name: Some(idx.handle.name.clone()),
                keys_examined,
                docs_examined: ids.len(),
                returned: out.len(),
                execution_time_ms: 0,
            };
            return (out, report);
        }
        let out: Vec<Book> =
            self.records.values().filter(|b| values_equal(&b.get(field), value)).cloned().collect();
        let report = ExplainReport {
            stage: "COLLSCAN".into(),
            index_name: None,
            keys_examined: 0,
            docs_examined: self.records.len(),
            returned: out.len(),
            execution_time_ms: 0,
        };
        (out, report)
    }
}

impl QueryCatalog {
    #[must_use]
    pub fn find_all(&self) -> Vec<Book> {
        let start = Instant::now();
        let out = self.snapshot();
        telemetry::log_query("find_all", "{}", out.len(), None, start.elapsed().as_millis());
        out
    }

    /// Equality filter, served by an index on `field` when one exists.
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidField` for unknown field names.
    pub fn find_by_field(&self, field: &str, value: &Bson) -> Result<Vec<Book>> {
        Ok(self.explain_and_find(field, value)?.0)
    }

    /// Runs an equality lookup and reports how it was executed.
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidField` for unknown field names.
    pub fn explain_find(&self, field: &str, value: &Bson) -> Result<ExplainReport> {
        Ok(self.explain_and_find(field, value)?.1)
    }

    fn explain_and_find(&self, field: &str, value: &Bson) -> Result<(Vec<Book>, ExplainReport)> {
        let f: BookField = field.parse()?;
        let start = Instant::now();
        let (out, mut report) = self.state.read().find_eq(f, value);
        report.execution_time_ms = start.elapsed().as_millis();
        telemetry::log_query(
            "find_by_field",
            &format!("{f} $eq {value}"),
            out.len(),
            report.index_name.as_deref(),
            report.execution_time_ms,
        );
        Ok((out, report))
    }

    /// # Errors
    /// Returns `CatalogError::InvalidField` for unknown field names.
    pub fn find_by_range(&self, field: &str, min: Bound<&Bson>, max: Bound<&Bson>) -> Result<Vec<Book>> {
        let start = Instant::now();
        let out = query::filter_by_range(&self.snapshot(), field, min, max)?;
        telemetry::log_query(
            "find_by_range",
            &format!("{field} {min:?} {max:?}"),
            out.len(),
            None,
            start.elapsed().as_millis(),
        );
        Ok(out)
    }

    #[must_use]
    pub fn find_combined(&self, predicates: &[Predicate]) -> Vec<Book> {
        let start = Instant::now();
        let out = query::filter_combined(&self.snapshot(), predicates);
        telemetry::log_query("find_combined", &format!("{predicates:?}"), out.len(), None, start.elapsed().as_millis());
        out
    }

    /// Whole record set ordered by `field`. A single-field index on `field` supplies the
    /// order directly; the result is identical to a stable sort either way.
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidField` for unknown field names.
    pub fn sorted_by(&self, field: &str, order: Order) -> Result<Vec<Book>> {
        let f: BookField = field.parse()?;
        let start = Instant::now();
        let st = self.state.read();
        let (out, used) = match st.indexes.for_sort(f) {
            Some(idx) => {
                let out: Vec<Book> =
                    idx.ordered_ids(order).iter().filter_map(|id| st.records.get(id)).cloned().collect();
                (out, Some(idx.handle.name.clone()))
            }
            None => (query::sort_by(&st.books(), field, order)?, None),
        };
        drop(st);
        telemetry::log_query("sort", &format!("{f} {order:?}"), out.len(), used.as_deref(), start.elapsed().as_millis());
        Ok(out)
    }

    /// # Errors
    /// Returns `CatalogError::InvalidField` for unknown field names.
    pub fn top_n(&self, field: &str, order: Order, n: usize) -> Result<Vec<Book>> {
        let mut out = self.sorted_by(field, order)?;
        out.truncate(n);
        Ok(out)
    }

    /// `page_index`-th page of `page_size` records in insertion order.
    #[must_use]
    pub fn page(&self, page_size: usize, page_index: usize) -> Vec<Book> {
        let start = Instant::now();
        let out = query::paginate(&self.snapshot(), page_size, page_index);
        telemetry::log_query("page", &format!("{page_size} {page_index}"), out.len(), None, start.elapsed().as_millis());
        out
    }

    /// # Errors
    /// See [`crate::aggregate::group_by`].
    pub fn group_by(&self, key: &str, avg_field: Option<&str>, order: GroupOrder) -> Result<Vec<GroupRow>> {
        let start = Instant::now();
        let rows = group_by(&self.snapshot(), key, avg_field, order)?;
        telemetry::log_query("group", &format!("{key} {avg_field:?} {order:?}"), rows.len(), None, start.elapsed().as_millis());
        Ok(rows)
    }
}
