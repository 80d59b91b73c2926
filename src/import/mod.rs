mod csv;
mod detect;
mod ndjson;
mod options;
mod pipeline;

pub use detect::detect_format;
pub use options::{CsvOptions, ImportFormat, ImportOptions, ImportReport};
pub use pipeline::{load_books, load_books_from_path, load_books_with};
