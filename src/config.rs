//! Runner configuration.
//!
//! Precedence: config files (`BOOKSTORE_CONFIG`, `~/.config/bookstore.toml`,
//! `./bookstore.toml`, first one to set a key wins) > environment > defaults.

use crate::errors::{CatalogError, Result};
use crate::export::ExportFormat;
use crate::import::ImportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_SLOW_QUERY_MS: u64 = 500;

/// One layer of settings as read from a file or the environment. Unset keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub dataset: Option<PathBuf>,
    pub dataset_format: Option<ImportFormat>,
    pub output_format: Option<ExportFormat>,
    pub output_dir: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub slow_query_ms: Option<u64>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ConfigLayer {
    /// Fills every key still unset from `other`.
    pub fn fill_from(&mut self, other: Self) {
        if self.dataset.is_none() { self.dataset = other.dataset; }
        if self.dataset_format.is_none() { self.dataset_format = other.dataset_format; }
        if self.output_format.is_none() { self.output_format = other.output_format; }
        if self.output_dir.is_none() { self.output_dir = other.output_dir; }
        if self.page_size.is_none() { self.page_size = other.page_size; }
        if self.slow_query_ms.is_none() { self.slow_query_ms = other.slow_query_ms; }
        if self.log_dir.is_none() { self.log_dir = other.log_dir; }
        if self.log_level.is_none() { self.log_level = other.log_level; }
    }

    /// # Errors
    /// `CatalogError::Config` when the file exists but is not valid TOML for this layer.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let s = std::fs::read_to_string(path)?;
        toml::from_str::<Self>(&s)
            .map(Some)
            .map_err(|e| CatalogError::Config(format!("{}: {e}", path.display())))
    }

    /// Builds a layer from `BOOKSTORE_*` variables looked up through `get`.
    ///
    /// # Errors
    /// `CatalogError::Config` for values that do not parse.
    pub fn from_env_with<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layer = Self {
            dataset: get("BOOKSTORE_DATASET").map(PathBuf::from),
            log_dir: get("BOOKSTORE_LOG_DIR").map(PathBuf::from),
            log_level: get("BOOKSTORE_LOG_LEVEL"),
            output_dir: get("BOOKSTORE_OUTPUT_DIR").map(PathBuf::from),
            ..Self::default()
        };
        if let Some(s) = get("BOOKSTORE_OUTPUT") {
            layer.output_format = Some(parse_output_format(&s)?);
        }
        if let Some(s) = get("BOOKSTORE_PAGE_SIZE") {
            layer.page_size =
                Some(s.trim().parse().map_err(|_| CatalogError::Config(format!("BOOKSTORE_PAGE_SIZE: `{s}`")))?);
        }
        if let Some(s) = get("BOOKSTORE_SLOW_QUERY_MS") {
            layer.slow_query_ms =
                Some(s.trim().parse().map_err(|_| CatalogError::Config(format!("BOOKSTORE_SLOW_QUERY_MS: `{s}`")))?);
        }
        Ok(layer)
    }
}

/// Fully resolved settings for the report runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// `None` means the bundled sample dataset.
    pub dataset: Option<PathBuf>,
    pub dataset_format: ImportFormat,
    pub output_format: ExportFormat,
    /// `None` means stdout; otherwise one file per report is written here.
    pub output_dir: Option<PathBuf>,
    pub page_size: usize,
    pub slow_query_ms: u64,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_layer(ConfigLayer::default())
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn from_layer(l: ConfigLayer) -> Self {
        Self {
            dataset: l.dataset,
            dataset_format: l.dataset_format.unwrap_or_default(),
            output_format: l.output_format.unwrap_or_default(),
            output_dir: l.output_dir,
            page_size: l.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            slow_query_ms: l.slow_query_ms.unwrap_or(DEFAULT_SLOW_QUERY_MS),
            log_dir: l.log_dir,
            log_level: l.log_level,
        }
    }

    /// Merges `paths` in order (earlier wins), then `env`, then defaults.
    ///
    /// # Errors
    /// `CatalogError::Config` for an unreadable config file or a malformed value.
    pub fn resolve(paths: &[PathBuf], env: ConfigLayer) -> Result<Self> {
        let mut merged = ConfigLayer::default();
        for p in paths {
            if let Some(layer) = ConfigLayer::from_file(p)? {
                log::debug!("config: loaded {}", p.display());
                merged.fill_from(layer);
            }
        }
        merged.fill_from(env);
        if merged.page_size == Some(0) {
            return Err(CatalogError::Config("page_size must be at least 1".into()));
        }
        Ok(Self::from_layer(merged))
    }

    /// Resolves from the standard file locations and the process environment.
    ///
    /// # Errors
    /// See [`RunnerConfig::resolve`].
    pub fn load() -> Result<Self> {
        let env = ConfigLayer::from_env_with(|k| std::env::var(k).ok())?;
        Self::resolve(&config_paths(), env)
    }
}

/// Candidate config files, highest precedence first.
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(p) = std::env::var("BOOKSTORE_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join("bookstore.toml"));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("bookstore.toml"));
    }
    paths
}

fn parse_output_format(s: &str) -> Result<ExportFormat> {
    match s.trim().to_ascii_lowercase().as_str() {
        "table" => Ok(ExportFormat::Table),
        "ndjson" | "jsonl" => Ok(ExportFormat::Ndjson),
        "csv" => Ok(ExportFormat::Csv),
        other => Err(CatalogError::Config(format!("unknown output format `{other}`"))),
    }
}
