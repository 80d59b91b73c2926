//! Typed query-and-report runner over an in-memory bookstore collection.
//!
//! A [`QueryCatalog`] holds the books; [`report`] names the fixed set of queries and
//! aggregations run against it, and [`export`] renders their output.

pub mod aggregate;
pub mod book;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod export;
pub mod import;
pub mod index;
pub mod query;
pub mod report;
pub mod types;
pub mod utils;

pub use aggregate::{GroupKey, GroupOrder, GroupRow};
pub use book::{Book, PartialBook};
pub use catalog::{ExplainReport, QueryCatalog};
pub use config::RunnerConfig;
pub use errors::{CatalogError, Result};
pub use index::IndexHandle;
pub use query::telemetry;
pub use query::{CmpOp, Patch, Predicate};
pub use report::{NamedQuery, ReportOutput};
pub use types::{BookField, Order, RecordId};

/// Sample dataset shipped with the crate, used when no dataset is configured.
pub const BUNDLED_BOOKS: &str = include_str!("../data/books.json");
