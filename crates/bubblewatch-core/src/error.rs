use std::path::PathBuf;

use thiserror::Error;

/// Validation errors raised while constructing domain and config values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptySymbol,
    #[error("ticker length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter (after an optional '^'): '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
    #[error("ticker '{symbol}' ends with a separator")]
    SymbolDanglingSeparator { symbol: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },

    #[error("ticker list must contain at least one symbol")]
    EmptyTickerList,
    #[error("ticker '{symbol}' is listed more than once")]
    DuplicateTicker { symbol: String },
    #[error("'{field}' must be greater than zero")]
    ZeroSetting { field: &'static str },
}

/// Fatal failure while publishing a snapshot. The previously published file
/// is left untouched whenever one of these is returned.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("output path '{path}' has no file name")]
    InvalidPath { path: PathBuf },

    #[error("failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stage temporary file in '{dir}': {source}")]
    Stage {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write snapshot contents: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to replace '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
