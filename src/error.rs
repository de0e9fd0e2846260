//! Error types for the review analyzer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, cleaning, or rendering a review table.
///
/// `DataLoad` covers I/O and schema problems with the input file, `Parse` covers
/// values that cannot be converted to their declared type. Both are fatal.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("failed to load review data from {path:?}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("row {row}: cannot parse {column} value {value:?} as a date/time")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviewError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_load_message_names_path() {
        let err = ReviewError::data_load("missing.tsv", "file not found");
        let msg = err.to_string();
        assert!(msg.contains("missing.tsv"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_parse_message_names_row_and_value() {
        let err = ReviewError::Parse {
            row: 3,
            column: "postedDate".to_string(),
            value: "yesterday".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "row 3: cannot parse postedDate value \"yesterday\" as a date/time"
        );
    }
}
