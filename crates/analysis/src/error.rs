use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Terminal analysis failures. Per-cell problems never surface here: bad
/// numeric cells degrade to 0.0 and bad date cells drop their row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Date column not found or not mapped")]
    DateColumnNotFound,

    #[error("No valid rows after parsing (check mapping and formats)")]
    NoValidRows,

    #[error("Finance mode needs a close-price column, or both price and quantity columns")]
    MissingFinanceColumns,

    #[error("Finance mode needs at least {needed} distinct days, found {found}")]
    InsufficientHistory { needed: usize, found: usize },
}
