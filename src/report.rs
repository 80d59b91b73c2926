//! The fixed catalog of named bookstore reports and the runner that executes them.

use crate::aggregate::{GroupOrder, GroupRow};
use crate::book::{Book, PartialBook};
use crate::catalog::{ExplainReport, QueryCatalog};
use crate::errors::Result;
use crate::index::IndexHandle;
use crate::query::{self, CmpOp, Patch, Predicate};
use crate::types::{BookField, Order};
use bson::{Bson, Document as BsonDocument, doc};
use std::fmt;

/// Every report the runner knows about. The set is closed.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedQuery {
    ByGenre(String),
    PublishedAfter(i64),
    ByAuthor(String),
    UpdatePriceByTitle { title: String, price: f64 },
    DeleteByTitle(String),
    InStockPublishedAfter(i64),
    TitleAuthorPrice,
    PriceAscending,
    PriceDescending,
    /// Zero-based `page_index`.
    Page { page_size: usize, page_index: usize },
    AveragePriceByGenre,
    MostProlificAuthor,
    BooksPerDecade,
    CreateTitleIndex,
    CreateAuthorYearIndex,
    ExplainTitle(String),
}

impl NamedQuery {
    /// The bookstore script in its original order.
    #[must_use]
    pub fn bookstore_script(page_size: usize) -> Vec<Self> {
        vec![
            Self::ByGenre("Fiction".into()),
            Self::PublishedAfter(1950),
            Self::ByAuthor("George Orwell".into()),
            Self::UpdatePriceByTitle { title: "1984".into(), price: 13.99 },
            Self::DeleteByTitle("Moby Dick".into()),
            Self::InStockPublishedAfter(2010),
            Self::TitleAuthorPrice,
            Self::PriceAscending,
            Self::PriceDescending,
            Self::Page { page_size, page_index: 0 },
            Self::Page { page_size, page_index: 1 },
            Self::AveragePriceByGenre,
            Self::MostProlificAuthor,
            Self::BooksPerDecade,
            Self::CreateTitleIndex,
            Self::CreateAuthorYearIndex,
            Self::ExplainTitle("The Hobbit".into()),
        ]
    }

    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::UpdatePriceByTitle { .. } | Self::DeleteByTitle(_) | Self::CreateTitleIndex | Self::CreateAuthorYearIndex
        )
    }
}

impl fmt::Display for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByGenre(g) => write!(f, "Books in genre {g}"),
            Self::PublishedAfter(y) => write!(f, "Books published after {y}"),
            Self::ByAuthor(a) => write!(f, "Books by {a}"),
            Self::UpdatePriceByTitle { title, price } => write!(f, "Set price of {title} to {price}"),
            Self::DeleteByTitle(t) => write!(f, "Delete {t}"),
            Self::InStockPublishedAfter(y) => write!(f, "In stock and published after {y}"),
            Self::TitleAuthorPrice => f.write_str("Title, author and price"),
            Self::PriceAscending => f.write_str("Books by price, ascending"),
            Self::PriceDescending => f.write_str("Books by price, descending"),
            Self::Page { page_size, page_index } => write!(f, "Page {} ({page_size} per page)", page_index + 1),
            Self::AveragePriceByGenre => f.write_str("Average price by genre"),
            Self::MostProlificAuthor => f.write_str("Author with the most books"),
            Self::BooksPerDecade => f.write_str("Books per publication decade"),
            Self::CreateTitleIndex => f.write_str("Create index on title"),
            Self::CreateAuthorYearIndex => f.write_str("Create index on author and published_year"),
            Self::ExplainTitle(t) => write!(f, "Explain lookup of {t}"),
        }
    }
}

/// Result of one report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
    Books(Vec<Book>),
    Documents(Vec<PartialBook>),
    Groups { rows: Vec<GroupRow>, avg_field: Option<BookField>, count_label: &'static str },
    Updated(bool),
    Deleted(bool),
    Index(IndexHandle),
    Explain(ExplainReport),
}

impl ReportOutput {
    /// Flattens the output into documents ready for a sink.
    #[must_use]
    pub fn to_documents(&self) -> Vec<BsonDocument> {
        match self {
            Self::Books(books) => books.iter().map(Book::to_document).collect(),
            Self::Documents(docs) => docs.clone(),
            Self::Groups { rows, avg_field, count_label } => {
                rows.iter().map(|r| r.to_document_labeled(*avg_field, count_label)).collect()
            }
            Self::Updated(matched) => vec![doc! { "matched": *matched, "modified": *matched }],
            Self::Deleted(matched) => vec![doc! { "deleted": i64::from(*matched) }],
            Self::Index(h) => {
                let mut key = BsonDocument::new();
                for (f, o) in &h.fields {
                    key.insert(f.name(), o.as_i32());
                }
                vec![doc! { "name": h.name.clone(), "key": key }]
            }
            Self::Explain(r) => vec![doc! {
                "stage": r.stage.clone(),
                "index_name": r.index_name.clone().map_or(Bson::Null, Bson::String),
                "keys_examined": i64::try_from(r.keys_examined).unwrap_or(i64::MAX),
                "docs_examined": i64::try_from(r.docs_examined).unwrap_or(i64::MAX),
                "returned": i64::try_from(r.returned).unwrap_or(i64::MAX),
                "execution_time_ms": i64::try_from(r.execution_time_ms).unwrap_or(i64::MAX),
            }],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Books(b) => b.len(),
            Self::Documents(d) => d.len(),
            Self::Groups { rows, .. } => rows.len(),
            Self::Updated(_) | Self::Deleted(_) | Self::Index(_) | Self::Explain(_) => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Executes one named report against `catalog`.
///
/// # Errors
/// Propagates catalog errors; none occur for the built-in constants on a valid catalog.
pub fn run(catalog: &QueryCatalog, q: &NamedQuery) -> Result<ReportOutput> {
    log::debug!("report: {q}");
    let out = match q {
        NamedQuery::ByGenre(g) => ReportOutput::Books(catalog.find_by_field("genre", &Bson::String(g.clone()))?),
        NamedQuery::PublishedAfter(y) => {
            ReportOutput::Books(catalog.find_combined(&[Predicate::new("published_year", CmpOp::Gt, *y)?]))
        }
        NamedQuery::ByAuthor(a) => ReportOutput::Books(catalog.find_by_field("author", &Bson::String(a.clone()))?),
        NamedQuery::UpdatePriceByTitle { title, price } => {
            let patch = Patch::set("price", *price)?;
            ReportOutput::Updated(catalog.update_one("title", &Bson::String(title.clone()), &patch)?)
        }
        NamedQuery::DeleteByTitle(t) => ReportOutput::Deleted(catalog.delete_one("title", &Bson::String(t.clone()))?),
        NamedQuery::InStockPublishedAfter(y) => ReportOutput::Books(catalog.find_combined(&[
            Predicate::eq(BookField::InStock, true),
            Predicate::new("published_year", CmpOp::Gt, *y)?,
        ])),
        NamedQuery::TitleAuthorPrice => {
            ReportOutput::Documents(query::project(&catalog.find_all(), &["title", "author", "price"])?)
        }
        NamedQuery::PriceAscending => ReportOutput::Books(catalog.sorted_by("price", Order::Asc)?),
        NamedQuery::PriceDescending => ReportOutput::Books(catalog.sorted_by("price", Order::Desc)?),
        NamedQuery::Page { page_size, page_index } => ReportOutput::Books(catalog.page(*page_size, *page_index)),
        NamedQuery::AveragePriceByGenre => {
            let rows = catalog.group_by("genre", Some("price"), GroupOrder::AvgDesc)?;
            ReportOutput::Groups { rows, avg_field: Some(BookField::Price), count_label: "total_books" }
        }
        NamedQuery::MostProlificAuthor => {
            let mut rows = catalog.group_by("author", None, GroupOrder::CountDesc)?;
            rows.truncate(1);
            ReportOutput::Groups { rows, avg_field: None, count_label: "total_books" }
        }
        NamedQuery::BooksPerDecade => ReportOutput::Groups {
            rows: catalog.group_by("decade", None, GroupOrder::KeyAsc)?,
            avg_field: None,
            count_label: "count",
        },
        NamedQuery::CreateTitleIndex => ReportOutput::Index(catalog.create_index(&[("title", Order::Asc)])?),
        NamedQuery::CreateAuthorYearIndex => ReportOutput::Index(
            catalog.create_index(&[("author", Order::Asc), ("published_year", Order::Desc)])?,
        ),
        NamedQuery::ExplainTitle(t) => ReportOutput::Explain(catalog.explain_find("title", &Bson::String(t.clone()))?),
    };
    Ok(out)
}

/// Runs `queries` in order, stopping at the first error.
///
/// # Errors
/// The first error returned by [`run`].
pub fn run_all<'a>(
    catalog: &QueryCatalog,
    queries: &'a [NamedQuery],
) -> Result<Vec<(&'a NamedQuery, ReportOutput)>> {
    queries.iter().map(|q| run(catalog, q).map(|out| (q, out))).collect()
}
