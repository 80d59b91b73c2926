use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation error on `{field}`: {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl CatalogError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.to_string(), reason: reason.into() }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for CatalogError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
