use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{OpenFlags, ToSql};

use crate::error::{BindError, BoxError, ValueError};
use crate::traits::{Connection, ConnectionProvider, RowCursor, Statement};
use crate::types::{Row, SqlValue};

/// SQLite connection provider using rusqlite.
///
/// Opens a new connection to the database at `path` on every acquisition.
pub struct SqliteConnectionProvider {
    path: PathBuf,
    flags: OpenFlags,
    busy_timeout: Option<Duration>,
}

impl SqliteConnectionProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            flags: OpenFlags::default(),
            busy_timeout: None,
        }
    }

    /// Override the flags used to open each connection.
    pub fn with_flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Wait up to `timeout` on a locked database instead of failing at once.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn connection(&self) -> Result<Box<dyn Connection>, BoxError> {
        let connection = rusqlite::Connection::open_with_flags(&self.path, self.flags)?;
        if let Some(timeout) = self.busy_timeout {
            connection.busy_timeout(timeout)?;
        }
        log::trace!("opened sqlite connection to {}", self.path.display());
        Ok(Box::new(SqliteConnection { connection }))
    }
}

struct SqliteConnection {
    connection: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Box<dyn Statement + 'c>, BoxError> {
        let statement = self.connection.prepare(sql)?;
        let bound = vec![false; statement.parameter_count()];
        Ok(Box::new(SqliteStatement { statement, bound }))
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        log::trace!("releasing sqlite connection");
    }
}

/// SQLite reads an unbound `?` as NULL, so bound positions are tracked here
/// and execution refuses to run while any of them is still unset.
struct SqliteStatement<'c> {
    statement: rusqlite::Statement<'c>,
    bound: Vec<bool>,
}

impl SqliteStatement<'_> {
    fn check_bound(&self) -> Result<(), BoxError> {
        match self.bound.iter().position(|set| !set) {
            Some(missing) => Err(Box::new(BindError::ParameterNotSet {
                index: missing + 1,
                count: self.bound.len(),
            })),
            None => Ok(()),
        }
    }
}

impl Statement for SqliteStatement<'_> {
    fn set_object(&mut self, index: usize, value: &SqlValue) -> Result<(), BoxError> {
        self.statement.raw_bind_parameter(index, value)?;
        if let Some(set) = index.checked_sub(1).and_then(|slot| self.bound.get_mut(slot)) {
            *set = true;
        }
        Ok(())
    }

    fn execute_update(&mut self) -> Result<u64, BoxError> {
        self.check_bound()?;
        let affected = self.statement.raw_execute()?;
        Ok(affected as u64)
    }

    fn execute_query<'s>(&'s mut self) -> Result<Box<dyn RowCursor + 's>, BoxError> {
        self.check_bound()?;
        let columns: Arc<[String]> = self
            .statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = self.statement.raw_query();
        Ok(Box::new(SqliteCursor {
            rows,
            columns,
            current: None,
        }))
    }
}

struct SqliteCursor<'s> {
    rows: rusqlite::Rows<'s>,
    columns: Arc<[String]>,
    current: Option<Row>,
}

impl RowCursor for SqliteCursor<'_> {
    fn next(&mut self) -> Result<Option<&Row>, BoxError> {
        let Some(raw) = self.rows.next()? else {
            self.current = None;
            return Ok(None);
        };
        let values = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| column_value(column, raw.get_ref(index)?))
            .collect::<Result<Vec<_>, BoxError>>()?;
        Ok(Some(&*self.current.insert(Row::new(
            Arc::clone(&self.columns),
            values,
        ))))
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }
}

fn column_value(column: &str, value: ValueRef<'_>) -> Result<SqlValue, BoxError> {
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int64(i),
        ValueRef::Real(f) => SqlValue::Float64(f),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|source| ValueError::InvalidText {
                column: column.to_string(),
                source,
            })?;
            SqlValue::Text(text.to_string())
        }
        ValueRef::Blob(_) => {
            return Err(Box::new(ValueError::UnsupportedType {
                column: column.to_string(),
                type_name: "BLOB".to_string(),
            }))
        }
    })
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Int32(i) => ToSqlOutput::Owned(Value::Integer(i64::from(*i))),
            SqlValue::Int64(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Float64(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
        })
    }
}
