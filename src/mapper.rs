use std::marker::PhantomData;

use crate::error::BoxError;
use crate::traits::RowCursor;
use crate::types::Row;

/// Consumes a row cursor and produces a mapped value.
///
/// The mapper decides how far to advance the cursor. It only sees the cursor
/// for the duration of the call, so nothing it returns can borrow from it.
pub trait RowMapper<T> {
    fn map(&self, cursor: &mut dyn RowCursor) -> Result<T, BoxError>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&mut dyn RowCursor) -> Result<T, BoxError>,
{
    fn map(&self, cursor: &mut dyn RowCursor) -> Result<T, BoxError> {
        self(cursor)
    }
}

/// Advances once and maps that row, or yields `None` for an empty result.
pub struct FirstRow<F, T> {
    row_mapper: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> FirstRow<F, T>
where
    F: Fn(&Row) -> Result<T, BoxError>,
{
    pub fn new(row_mapper: F) -> Self {
        Self {
            row_mapper,
            _marker: PhantomData,
        }
    }
}

impl<F, T> RowMapper<Option<T>> for FirstRow<F, T>
where
    F: Fn(&Row) -> Result<T, BoxError>,
{
    fn map(&self, cursor: &mut dyn RowCursor) -> Result<Option<T>, BoxError> {
        cursor.next()?.map(&self.row_mapper).transpose()
    }
}

/// Advances until the cursor is exhausted, mapping every row in order.
pub struct AllRows<F, T> {
    row_mapper: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> AllRows<F, T>
where
    F: Fn(&Row) -> Result<T, BoxError>,
{
    pub fn new(row_mapper: F) -> Self {
        Self {
            row_mapper,
            _marker: PhantomData,
        }
    }
}

impl<F, T> RowMapper<Vec<T>> for AllRows<F, T>
where
    F: Fn(&Row) -> Result<T, BoxError>,
{
    fn map(&self, cursor: &mut dyn RowCursor) -> Result<Vec<T>, BoxError> {
        let mut mapped = Vec::new();
        while let Some(row) = cursor.next()? {
            mapped.push((self.row_mapper)(row)?);
        }
        Ok(mapped)
    }
}
