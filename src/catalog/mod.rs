mod find;
mod index_admin;
mod ops;
mod state;

pub use find::ExplainReport;
pub use state::QueryCatalog;
