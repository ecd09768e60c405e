use std::sync::Arc;

use crate::error::RowError;
use crate::types::{FromSqlValue, SqlValue};

/// A single row read from a cursor.
///
/// Drivers build one `Row` per advance; column names are shared across all
/// rows of a result. Lookups by name ignore ASCII case, the way unquoted SQL
/// identifiers do.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from column names and values in column order.
    ///
    /// A column without a value (or a value without a column) reads back as
    /// [`RowError::ColumnIndexOutOfRange`].
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Gets a typed value by column name.
    pub fn get<T: FromSqlValue>(&self, column: &str) -> Result<T, RowError> {
        let index = self.index_of(column)?;
        self.convert(column, self.value_at(index)?)
    }

    /// Gets a typed value by zero-based column position.
    pub fn get_index<T: FromSqlValue>(&self, index: usize) -> Result<T, RowError> {
        let value = self.value_at(index)?;
        let column = self.columns.get(index).ok_or(RowError::ColumnIndexOutOfRange {
            index,
            len: self.columns.len(),
        })?;
        self.convert(column, value)
    }

    /// Gets the raw value by column name.
    pub fn get_value(&self, column: &str) -> Result<&SqlValue, RowError> {
        let index = self.index_of(column)?;
        self.value_at(index)
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn index_of(&self, column: &str) -> Result<usize, RowError> {
        self.columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .ok_or_else(|| RowError::ColumnNotFound(column.to_string()))
    }

    fn value_at(&self, index: usize) -> Result<&SqlValue, RowError> {
        self.values.get(index).ok_or(RowError::ColumnIndexOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    fn convert<T: FromSqlValue>(&self, column: &str, value: &SqlValue) -> Result<T, RowError> {
        T::from_sql_value(value).ok_or_else(|| RowError::TypeMismatch {
            column: column.to_string(),
            expected: std::any::type_name::<T>(),
            actual: value.type_name(),
        })
    }
}
