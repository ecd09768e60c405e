use crate::error::BoxError;
use crate::types::Row;

/// Forward-only, single-pass cursor over a query's result rows.
pub trait RowCursor {
    /// Advance to the next row, returning it, or `None` once exhausted.
    fn next(&mut self) -> Result<Option<&Row>, BoxError>;

    /// Column names of the result, in select order.
    fn columns(&self) -> &[String];
}
