use bson::Document as BsonDocument;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::csv::load_csv;
use super::detect::detect_format;
use super::ndjson::{load_json_array, load_ndjson};
use super::options::{ImportFormat, ImportOptions, ImportReport};
use crate::book::Book;
use crate::errors::{CatalogError, Result};

/// Loads books from a file, detecting the format when `opts.format` is `Auto`.
///
/// # Errors
/// I/O errors, malformed JSON/CSV, and validation failures unless `opts.skip_errors`.
pub fn load_books_from_path<P: AsRef<Path>>(path: P, opts: &ImportOptions) -> Result<(Vec<Book>, ImportReport)> {
    log::info!("loading books from {}", path.as_ref().display());
    let file = File::open(&path)?;
    let mut reader = BufReader::new(file);
    let format = match opts.format {
        ImportFormat::Auto => detect_format(&mut reader, Some(path.as_ref()))?,
        other => other,
    };
    load_books_with(reader, format, opts)
}

/// Loads books with default options: any invalid record aborts the load.
///
/// # Errors
/// See [`load_books_with`].
pub fn load_books<R: Read>(reader: R, format: ImportFormat) -> Result<Vec<Book>> {
    load_books_with(reader, format, &ImportOptions::default()).map(|(books, _)| books)
}

/// # Errors
/// I/O errors, malformed input, and validation failures unless `opts.skip_errors`.
pub fn load_books_with<R: Read>(reader: R, format: ImportFormat, opts: &ImportOptions) -> Result<(Vec<Book>, ImportReport)> {
    let mut report = ImportReport::default();
    let mut reader = BufReader::new(reader);
    let format = match format {
        ImportFormat::Auto => detect_format(&mut reader, None)?,
        other => other,
    };
    let books = match format {
        ImportFormat::Json => load_json_array(reader, opts, &mut report)?,
        ImportFormat::Ndjson => load_ndjson(reader, opts, &mut report)?,
        ImportFormat::Csv => load_csv(reader, opts, &mut report)?,
        ImportFormat::Auto => return Err(CatalogError::Query("format detection did not resolve".into())),
    };
    log::info!("loaded {} books ({} skipped, {format:?})", report.loaded, report.skipped);
    Ok((books, report))
}

/// Validates one parsed record and either keeps it, skips it, or aborts with the error
/// tagged by record number.
pub(crate) fn accept(
    parsed: Result<BsonDocument>,
    record_no: usize,
    opts: &ImportOptions,
    report: &mut ImportReport,
    out: &mut Vec<Book>,
) -> Result<()> {
    match parsed.and_then(|d| Book::from_document(&d)) {
        Ok(book) => {
            out.push(book);
            report.loaded += 1;
            if let Some(n) = opts.progress_every
                && n > 0
                && record_no % n == 0
            {
                log::info!("loaded {} records", report.loaded);
            }
            Ok(())
        }
        Err(e) if opts.skip_errors => {
            log::warn!("skipping record {record_no}: {e}");
            report.skipped += 1;
            Ok(())
        }
        Err(CatalogError::Validation { field, reason }) => {
            Err(CatalogError::Validation { field, reason: format!("record {record_no}: {reason}") })
        }
        Err(e) => Err(e),
    }
}
