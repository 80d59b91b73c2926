use bookstore_catalog::export::{ExportFormat, ExportOptions, export_file, render_documents};
use bookstore_catalog::import::{ImportFormat, ImportOptions, load_books_from_path, load_books_with};
use bookstore_catalog::report::{self, NamedQuery};
use bookstore_catalog::utils::logger;
use bookstore_catalog::{BUNDLED_BOOKS, QueryCatalog, Result, RunnerConfig, telemetry};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cfg = match RunnerConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("bookstore-report: {e}");
            return ExitCode::from(2);
        }
    };
    logger::configure_from_env(cfg.log_dir.as_deref(), cfg.log_level.as_deref());
    telemetry::set_slow_query_ms(cfg.slow_query_ms);

    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("report run failed: {e}");
            eprintln!("bookstore-report: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: &RunnerConfig) -> Result<()> {
    let opts = ImportOptions { format: cfg.dataset_format, ..ImportOptions::default() };
    let books = match &cfg.dataset {
        Some(path) => {
            let (books, rep) = load_books_from_path(path, &opts)?;
            log::info!("loaded {} books from {} ({} skipped)", rep.loaded, path.display(), rep.skipped);
            books
        }
        None => load_books_with(BUNDLED_BOOKS.as_bytes(), ImportFormat::Json, &opts)?.0,
    };
    let catalog = QueryCatalog::with_books("books", books)?;
    let script = NamedQuery::bookstore_script(cfg.page_size);
    let export_opts = ExportOptions { format: cfg.output_format, ..ExportOptions::default() };

    let stdout = io::stdout();
    for (i, q) in script.iter().enumerate() {
        let docs = report::run(&catalog, q)?.to_documents();
        match &cfg.output_dir {
            Some(dir) => {
                let path = dir.join(report_file_name(i + 1, q, cfg.output_format));
                export_file(&docs, &path, &export_opts)?;
                log::info!("wrote {}", path.display());
            }
            None => {
                let mut out = stdout.lock();
                if cfg.output_format == ExportFormat::Table {
                    writeln!(out, "\n== {}. {q} ==", i + 1)?;
                } else {
                    eprintln!("# {}. {q}", i + 1);
                }
                render_documents(&docs, &mut out, &export_opts)?;
            }
        }
    }
    log::info!("{}", telemetry::metrics_text().trim_end());
    Ok(())
}

fn report_file_name(n: usize, q: &NamedQuery, format: ExportFormat) -> String {
    let slug: String = q
        .to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let ext = match format {
        ExportFormat::Table => "txt",
        ExportFormat::Ndjson => "ndjson",
        ExportFormat::Csv => "csv",
    };
    format!("{n:02}_{}.{ext}", slug.trim_matches('_'))
}
