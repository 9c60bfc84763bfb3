//! Error types for forcepull-table.

/// Result type alias for forcepull-table operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for forcepull-table operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Delimited content could not be decoded.
    #[error("CSV error: {0}")]
    Csv(String),

    /// A column was given the wrong number of cells for this table.
    #[error("column '{column}' has {actual} cells, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// In strict mode, a column's non-null cells disagreed about their
    /// relationship shape.
    #[error("column '{column}' mixes relationship shapes")]
    MixedShapes { column: String },
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::with_source(ErrorKind::Csv(err.to_string()), err)
    }
}
