mod options;
mod pipeline;
mod sinks;

pub use options::{CsvOptions, ExportFormat, ExportOptions, ExportReport};
pub use pipeline::{export_file, render_documents};
pub use sinks::{CsvSink, ReportSink, NdjsonSink, TableSink};
