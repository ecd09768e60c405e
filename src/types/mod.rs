mod row;
mod sql_value;

pub use row::Row;
pub use sql_value::{FromSqlValue, SqlValue};
