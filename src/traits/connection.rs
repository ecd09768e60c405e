use crate::error::BoxError;
use crate::traits::RowCursor;
use crate::types::SqlValue;

/// An open database connection.
///
/// Dropping the connection releases it. Statements borrow the connection, so
/// they are always released first.
pub trait Connection {
    /// Prepare `sql` as given. The text is passed to the backend verbatim.
    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Box<dyn Statement + 'c>, BoxError>;
}

/// A prepared statement with positional parameter slots.
pub trait Statement {
    /// Set the parameter at the 1-based `index`.
    ///
    /// Type coercion is left to the driver. Implementations do not check the
    /// index against the placeholder count; a mismatch surfaces when the
    /// statement executes.
    fn set_object(&mut self, index: usize, value: &SqlValue) -> Result<(), BoxError>;

    /// Execute as an update, returning the number of affected rows.
    fn execute_update(&mut self) -> Result<u64, BoxError>;

    /// Execute as a query. The cursor borrows the statement and must be
    /// dropped before it.
    fn execute_query<'s>(&'s mut self) -> Result<Box<dyn RowCursor + 's>, BoxError>;
}
