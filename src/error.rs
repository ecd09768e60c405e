use std::error::Error as StdError;

use thiserror::Error;

/// A driver or callback failure that has not been translated yet.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The single error type surfaced by the statement template.
///
/// Every variant wraps the original failure, which stays reachable through
/// [`StdError::source`] or [`DataAccessError::cause`].
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(#[source] BoxError),

    #[error("Statement failed: {0}")]
    Statement(#[source] BoxError),

    #[error("Row mapping failed: {0}")]
    Mapping(#[source] BoxError),
}

impl DataAccessError {
    /// The underlying failure this error wraps.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match self {
            Self::ConnectionUnavailable(cause) | Self::Statement(cause) | Self::Mapping(cause) => {
                &**cause
            }
        }
    }

    /// Consumes the error, returning the underlying failure.
    pub fn into_cause(self) -> BoxError {
        match self {
            Self::ConnectionUnavailable(cause) | Self::Statement(cause) | Self::Mapping(cause) => {
                cause
            }
        }
    }
}

/// Errors raised while reading columns out of a [`Row`](crate::Row).
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column index {index} out of range for a row of {len} column(s)")]
    ColumnIndexOutOfRange { index: usize, len: usize },

    #[error("Column {column} holds {actual}, cannot read it as {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Errors raised while writing parameters into a statement.
#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("Parameter index {0} is out of range, positions start at 1")]
    IndexOutOfRange(usize),

    #[error("Parameter {index} of {count} was not set")]
    ParameterNotSet { index: usize, count: usize },
}

/// Errors raised by drivers while turning column data into [`SqlValue`](crate::SqlValue)s.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("Column {column} has unsupported type {type_name}")]
    UnsupportedType { column: String, type_name: String },

    #[error("Column {column} holds invalid UTF-8 text")]
    InvalidText {
        column: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, DataAccessError>;
