//! Error types for quotation generation

use docx_template::DocxError;
use thiserror::Error;

/// Errors that can occur while generating a quotation
#[derive(Debug, Error)]
pub enum QuotationError {
    /// Request data failed validation
    #[error("Invalid quotation data: {0}")]
    InvalidData(String),

    /// Template could not be read, filled or written
    #[error("Template error: {0}")]
    Template(#[from] DocxError),

    /// IO error reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a control mapping file
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Date format string chrono cannot render
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),
}

/// Result type for quotation operations
pub type Result<T> = std::result::Result<T, QuotationError>;
