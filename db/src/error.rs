//! Error types for binding, parsing, and execution.
//!
//! Errors raised by this crate (binding, cardinality, column extraction) are kept
//! apart from failures reported by the underlying driver so callers can tell a
//! configuration mistake from a data or connectivity failure.

use thiserror::Error;

/// Failure reported by the database driver, passed through unmodified.
#[derive(Error, Debug)]
pub enum DriverError {
    #[cfg(feature = "backend-sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "backend-postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] postgres::Error),

    /// Driver-side failure that has no dedicated variant (e.g. a poisoned client lock)
    #[error("{0}")]
    Other(String),
}

/// Errors returned by queries, parsers, and deconstructors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing value for placeholder '{name}'")]
    MissingParam { name: String },

    #[error("Parameter '{name}' does not match any placeholder in the query")]
    UnknownParam { name: String },

    #[error("Parameter '{name}' supplied more than once")]
    DuplicateParam { name: String },

    #[error("Expected exactly one row, found none")]
    NoRows,

    #[error("Expected exactly one row, found more than one")]
    TooManyRows,

    #[error("Missing column '{name}' in query result")]
    MissingColumn { name: String },

    #[error("Column '{column}' is NULL")]
    UnexpectedNull { column: String },

    #[error("Column '{column}': expected {expected}, found {found}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("Batch item {index} failed: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl Error {
    /// True for placeholder/parameter mismatches detected before execution.
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            Error::MissingParam { .. } | Error::UnknownParam { .. } | Error::DuplicateParam { .. }
        )
    }

    /// True when a single-row read saw zero or several rows.
    pub fn is_cardinality(&self) -> bool {
        matches!(self, Error::NoRows | Error::TooManyRows)
    }

    /// True when the failure came from the driver, including inside a batch item.
    pub fn is_driver(&self) -> bool {
        match self {
            Error::Driver(_) => true,
            Error::BatchItem { source, .. } => source.is_driver(),
            _ => false,
        }
    }
}

#[cfg(feature = "backend-sqlite")]
impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Driver(DriverError::Sqlite(e))
    }
}

#[cfg(feature = "backend-postgres")]
impl From<postgres::Error> for Error {
    fn from(e: postgres::Error) -> Self {
        Error::Driver(DriverError::Postgres(e))
    }
}

/// Result type for quarry operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::MissingParam { name: "id".into() }, true, false, false)]
    #[case(Error::UnknownParam { name: "id".into() }, true, false, false)]
    #[case(Error::DuplicateParam { name: "id".into() }, true, false, false)]
    #[case(Error::NoRows, false, true, false)]
    #[case(Error::TooManyRows, false, true, false)]
    #[case(Error::Driver(DriverError::Other("boom".into())), false, false, true)]
    #[case(Error::MissingColumn { name: "x".into() }, false, false, false)]
    fn test_error_classification(
        #[case] err: Error,
        #[case] binding: bool,
        #[case] cardinality: bool,
        #[case] driver: bool,
    ) {
        assert_eq!(err.is_binding(), binding);
        assert_eq!(err.is_cardinality(), cardinality);
        assert_eq!(err.is_driver(), driver);
    }

    #[rstest]
    fn test_batch_item_wrapping_driver_error_is_driver() {
        let err = Error::BatchItem {
            index: 2,
            source: Box::new(Error::Driver(DriverError::Other("constraint".into()))),
        };
        assert!(err.is_driver());
        assert_eq!(err.to_string(), "Batch item 2 failed: constraint");
    }

    #[rstest]
    fn test_missing_param_message() {
        let err = Error::MissingParam { name: "isbn".into() };
        assert_eq!(err.to_string(), "Missing value for placeholder 'isbn'");
    }
}
