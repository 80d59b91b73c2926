use bson::Document as BsonDocument;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use super::options::{ExportFormat, ExportOptions, ExportReport};
use super::sinks::{CsvSink, ReportSink, NdjsonSink, TableSink};

/// Renders `docs` into `writer` in the configured format.
///
/// # Errors
/// Returns I/O errors from the writer.
pub fn render_documents<W: Write>(docs: &[BsonDocument], writer: W, opts: &ExportOptions) -> io::Result<ExportReport> {
    let mut sink: Box<dyn ReportSink> = match opts.format {
        ExportFormat::Table => Box::new(TableSink::new(writer)),
        ExportFormat::Ndjson => Box::new(NdjsonSink::new(writer)),
        ExportFormat::Csv => Box::new(CsvSink::new(writer, opts.csv.delimiter, opts.csv.write_headers)),
    };
    let mut report = ExportReport::default();
    for d in docs {
        sink.write_doc(d)?;
        report.written += 1;
    }
    sink.finish()?;
    Ok(report)
}

/// Writes `docs` to `path` atomically via a temp file in the same directory + persist.
///
/// # Errors
/// Returns an error if the destination cannot be created or the write/persist fails.
pub fn export_file(docs: &[BsonDocument], path: impl AsRef<Path>, opts: &ExportOptions) -> io::Result<ExportReport> {
    let dest = path.as_ref();
    log::info!("export: {} documents to {}", docs.len(), dest.display());
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = NamedTempFile::new_in(parent)?;
    let report = render_documents(docs, &mut tmp, opts)?;
    tmp.persist(dest).map_err(|pe| pe.error)?;
    Ok(report)
}
