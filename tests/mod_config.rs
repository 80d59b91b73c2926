use bookstore_catalog::config::{ConfigLayer, DEFAULT_PAGE_SIZE, RunnerConfig};
use bookstore_catalog::export::ExportFormat;
use bookstore_catalog::import::ImportFormat;
use bookstore_catalog::CatalogError;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::tempdir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |k| map.get(k).cloned()
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = RunnerConfig::resolve(&[], ConfigLayer::default()).unwrap();
    assert_eq!(cfg, RunnerConfig::default());
    assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(cfg.slow_query_ms, 500);
    assert_eq!(cfg.output_format, ExportFormat::Table);
    assert_eq!(cfg.dataset_format, ImportFormat::Auto);
    assert!(cfg.dataset.is_none());
}

#[test]
fn earlier_files_win_and_env_fills_gaps() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.toml");
    let second = dir.path().join("second.toml");
    std::fs::write(&first, "page_size = 3\noutput_format = \"csv\"\n").unwrap();
    std::fs::write(&second, "page_size = 9\ndataset = \"/data/books.ndjson\"\ndataset_format = \"ndjson\"\n").unwrap();

    let env_layer = ConfigLayer::from_env_with(env(&[
        ("BOOKSTORE_PAGE_SIZE", "42"),
        ("BOOKSTORE_SLOW_QUERY_MS", "25"),
        ("BOOKSTORE_OUTPUT", "ndjson"),
    ]))
    .unwrap();
    let missing = dir.path().join("absent.toml");
    let cfg = RunnerConfig::resolve(&[missing, first, second], env_layer).unwrap();
    assert_eq!(cfg.page_size, 3);
    assert_eq!(cfg.output_format, ExportFormat::Csv);
    assert_eq!(cfg.dataset, Some(PathBuf::from("/data/books.ndjson")));
    assert_eq!(cfg.dataset_format, ImportFormat::Ndjson);
    assert_eq!(cfg.slow_query_ms, 25);
}

#[test]
fn env_layer_parses_values() {
    let layer = ConfigLayer::from_env_with(env(&[
        ("BOOKSTORE_DATASET", "books.json"),
        ("BOOKSTORE_OUTPUT", " JSONL "),
        ("BOOKSTORE_OUTPUT_DIR", "out"),
        ("BOOKSTORE_LOG_LEVEL", "debug"),
    ]))
    .unwrap();
    assert_eq!(layer.dataset, Some(PathBuf::from("books.json")));
    assert_eq!(layer.output_format, Some(ExportFormat::Ndjson));
    assert_eq!(layer.output_dir, Some(PathBuf::from("out")));
    assert_eq!(layer.log_level.as_deref(), Some("debug"));
    assert!(layer.page_size.is_none());
}

#[test]
fn malformed_values_are_config_errors() {
    assert!(matches!(
        ConfigLayer::from_env_with(env(&[("BOOKSTORE_PAGE_SIZE", "five")])),
        Err(CatalogError::Config(_))
    ));
    assert!(matches!(
        ConfigLayer::from_env_with(env(&[("BOOKSTORE_OUTPUT", "xml")])),
        Err(CatalogError::Config(_))
    ));

    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "page_size = \"many\"\n").unwrap();
    assert!(matches!(RunnerConfig::resolve(&[bad], ConfigLayer::default()), Err(CatalogError::Config(_))));

    let unknown = dir.path().join("unknown.toml");
    std::fs::write(&unknown, "colour = \"blue\"\n").unwrap();
    assert!(matches!(RunnerConfig::resolve(&[unknown], ConfigLayer::default()), Err(CatalogError::Config(_))));

    let zero = ConfigLayer { page_size: Some(0), ..ConfigLayer::default() };
    assert!(matches!(RunnerConfig::resolve(&[], zero), Err(CatalogError::Config(_))));
}
