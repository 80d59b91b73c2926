use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    #[default]
    Auto,
    /// A single JSON array of book objects, as `mongoimport --jsonArray` expects.
    Json,
    Ndjson,
    Csv,
}

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub format: ImportFormat,
    /// Skip records that fail validation instead of aborting the load.
    pub skip_errors: bool,
    pub csv: CsvOptions,
    pub progress_every: Option<usize>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { format: ImportFormat::Auto, skip_errors: false, csv: CsvOptions::default(), progress_every: Some(1000) }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub loaded: u64,
    pub skipped: u64,
}
