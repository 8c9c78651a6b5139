use crate::types::Column;
use thiserror::Error;

/// The result set does not have the shape the pipeline needs. Never
/// recovered locally: the offending column and value are reported as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("required column `{column}` is missing from the result set")]
    MissingColumn { column: Column },

    #[error("month value `{value}` in column `{column}` (row {row}) is outside 1-12")]
    MonthOutOfRange {
        column: String,
        row: usize,
        value: String,
    },

    #[error("invalid value `{value}` in column `{column}` (row {row})")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("row {row} has {got} cells but the header declares {want}")]
    RaggedRow { row: usize, got: usize, want: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FormatError {
    #[error("cannot format non-finite amount {0}")]
    NonFinite(f64),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("date range start {start} is after end {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Non-fatal conditions. An empty result is a valid state the caller
/// presents as "no data", distinct from any error above.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineWarning {
    #[error("no data found for the selected period")]
    EmptyResult,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
