//! Error types for the anofox-panel library.

use thiserror::Error;

/// Result type alias for panel operations.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors that can occur while building a supervised table from a panel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A configured column is absent from the input.
    #[error("missing column: {column}")]
    MissingColumn { column: String },

    /// A column does not hold the kind of values an operation requires.
    #[error("column '{column}' must be {expected}")]
    ColumnType { column: String, expected: &'static str },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// No column qualifies as a series identifier.
    #[error("series identifier detection failed: {0}")]
    IdentifierDetection(String),

    /// Surviving series do not share one calendar.
    #[error("ragged panel: {0}")]
    RaggedPanel(String),

    /// No non-zero boundary divisible by the series count exists.
    #[error(
        "no boundary divisible by {series} series when splitting {rows} rows into {parts} parts"
    )]
    FoldBoundary {
        rows: usize,
        series: usize,
        parts: usize,
    },

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// Input that makes a statistical test undefined (e.g. a constant series).
    #[error("degenerate series: {0}")]
    DegenerateSeries(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed CSV input or failed CSV output.
    #[error("csv error: {0}")]
    Csv(String),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PanelError {
    fn from(err: std::io::Error) -> Self {
        PanelError::Io(err.to_string())
    }
}

impl From<csv::Error> for PanelError {
    fn from(err: csv::Error) -> Self {
        PanelError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        PanelError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = PanelError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = PanelError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = PanelError::MissingColumn {
            column: "Weekly_Sales".to_string(),
        };
        assert_eq!(err.to_string(), "missing column: Weekly_Sales");

        let err = PanelError::ColumnType {
            column: "Store".to_string(),
            expected: "numeric",
        };
        assert_eq!(err.to_string(), "column 'Store' must be numeric");

        let err = PanelError::FoldBoundary {
            rows: 5,
            series: 3,
            parts: 4,
        };
        assert_eq!(
            err.to_string(),
            "no boundary divisible by 3 series when splitting 5 rows into 4 parts"
        );
    }

    #[test]
    fn foreign_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(PanelError::from(io), PanelError::Io(msg) if msg.contains("gone")));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(PanelError::from(json), PanelError::Config(_)));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = PanelError::RaggedPanel("series 2 starts late".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
