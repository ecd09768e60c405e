use crate::error::BoxError;
use crate::traits::Statement;
use crate::types::SqlValue;

/// Writes parameter values into a prepared statement.
///
/// Implemented for any `Fn(&mut dyn Statement) -> Result<(), BoxError>`, so a
/// closure can serve as a binder:
///
/// ```
/// use sqltemplate::{BoxError, SqlValue, Statement};
///
/// let binder = |statement: &mut dyn Statement| -> Result<(), BoxError> {
///     statement.set_object(1, &SqlValue::from("alice"))?;
///     statement.set_object(2, &SqlValue::from(30))
/// };
/// # let _ = binder;
/// ```
pub trait ParameterBinder {
    fn bind(&self, statement: &mut dyn Statement) -> Result<(), BoxError>;
}

impl<F> ParameterBinder for F
where
    F: Fn(&mut dyn Statement) -> Result<(), BoxError>,
{
    fn bind(&self, statement: &mut dyn Statement) -> Result<(), BoxError> {
        self(statement)
    }
}

/// Binds an ordered parameter list: the value at list position `i` goes to
/// placeholder `i + 1`.
///
/// The list length is not checked against the statement; the backend
/// reports any mismatch when the statement runs.
#[derive(Debug, Clone, Copy)]
pub struct PositionalBinder<'a> {
    params: &'a [SqlValue],
}

impl<'a> PositionalBinder<'a> {
    pub fn new(params: &'a [SqlValue]) -> Self {
        Self { params }
    }
}

impl ParameterBinder for PositionalBinder<'_> {
    fn bind(&self, statement: &mut dyn Statement) -> Result<(), BoxError> {
        for (i, value) in self.params.iter().enumerate() {
            statement.set_object(i + 1, value)?;
        }
        Ok(())
    }
}
