//! Error types for catalog loading

use thiserror::Error;

/// Errors raised while building or loading message catalogs.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Invalid locale tag
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Catalog file could not be interpreted
    #[error("Failed to parse message file: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}
