use thiserror::Error;

/// Failures of the cleaning / analysis pipeline.
///
/// Malformed cell values are never errors; they normalize to
/// [`crate::data::model::CellValue::Missing`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("column '{0}' is required but absent from the table")]
    MissingColumn(String),

    #[error("column '{0}' has more than one normalization rule")]
    DuplicateRule(String),

    #[error("invalid rule for column '{column}': {reason}")]
    InvalidRule { column: String, reason: String },

    #[error("row {row} is out of range (table has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("column '{column}' row {row} holds non-numeric value '{value}'")]
    NonNumericCell {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column '{column}' has {found} value groups, need at least {needed}")]
    InsufficientCategories {
        column: String,
        found: usize,
        needed: usize,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
