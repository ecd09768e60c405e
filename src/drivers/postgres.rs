use std::error::Error;
use std::sync::Arc;

use bytes::BytesMut;
use postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use postgres::{Client, Config, NoTls};

use crate::error::{BindError, BoxError, DataAccessError, Result as DataResult, ValueError};
use crate::traits::{Connection, ConnectionProvider, RowCursor, Statement};
use crate::types::{Row, SqlValue};

/// PostgreSQL connection provider using the blocking `postgres` client.
///
/// The connection string is parsed once up front; each acquisition opens a
/// new session with it.
#[derive(Debug)]
pub struct PostgresConnectionProvider {
    config: Config,
}

impl PostgresConnectionProvider {
    /// Parse a libpq-style or URL connection string.
    ///
    /// # Example
    /// ```ignore
    /// let provider = PostgresConnectionProvider::new("host=localhost user=postgres")?;
    /// ```
    pub fn new(connection_string: &str) -> DataResult<Self> {
        let config = connection_string
            .parse::<Config>()
            .map_err(|e| DataAccessError::ConnectionUnavailable(Box::new(e)))?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }
}

impl ConnectionProvider for PostgresConnectionProvider {
    fn connection(&self) -> Result<Box<dyn Connection>, BoxError> {
        let client = self.config.connect(NoTls)?;
        log::trace!("opened postgres connection");
        Ok(Box::new(PostgresConnection { client }))
    }
}

struct PostgresConnection {
    client: Client,
}

impl Connection for PostgresConnection {
    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Box<dyn Statement + 'c>, BoxError> {
        let statement = self.client.prepare(sql)?;
        Ok(Box::new(PostgresStatement {
            client: &mut self.client,
            statement,
            params: Vec::new(),
        }))
    }
}

impl Drop for PostgresConnection {
    fn drop(&mut self) {
        log::trace!("releasing postgres connection");
    }
}

/// Parameters are collected here and sent with the execute call.
struct PostgresStatement<'c> {
    client: &'c mut Client,
    statement: postgres::Statement,
    params: Vec<SqlValue>,
}

impl Statement for PostgresStatement<'_> {
    fn set_object(&mut self, index: usize, value: &SqlValue) -> Result<(), BoxError> {
        if index == 0 {
            return Err(Box::new(BindError::IndexOutOfRange(index)));
        }
        if self.params.len() < index {
            self.params.resize(index, SqlValue::Null);
        }
        self.params[index - 1] = value.clone();
        Ok(())
    }

    fn execute_update(&mut self) -> Result<u64, BoxError> {
        let params = param_refs(&self.params);
        Ok(self.client.execute(&self.statement, &params)?)
    }

    fn execute_query<'s>(&'s mut self) -> Result<Box<dyn RowCursor + 's>, BoxError> {
        let params = param_refs(&self.params);
        let rows = self.client.query(&self.statement, &params)?;
        let columns = self.statement.columns();
        Ok(Box::new(PostgresCursor {
            columns: columns.iter().map(|c| c.name().to_string()).collect(),
            types: columns.iter().map(|c| c.type_().clone()).collect(),
            rows: rows.into_iter(),
            current: None,
        }))
    }
}

fn param_refs(params: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Rows are fetched in full by the query and handed out one at a time.
struct PostgresCursor {
    columns: Arc<[String]>,
    types: Vec<Type>,
    rows: std::vec::IntoIter<postgres::Row>,
    current: Option<Row>,
}

impl RowCursor for PostgresCursor {
    fn next(&mut self) -> Result<Option<&Row>, BoxError> {
        let Some(raw) = self.rows.next() else {
            self.current = None;
            return Ok(None);
        };
        let values = self
            .types
            .iter()
            .enumerate()
            .map(|(index, ty)| column_value(&raw, index, ty, &self.columns[index]))
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

/// Convert the value at `index` according to its column type.
fn column_value(
    row: &postgres::Row,
    index: usize,
    ty: &Type,
    column: &str,
) -> Result<SqlValue, BoxError> {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)?.map(SqlValue::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)?
            .map(|v| SqlValue::Int32(i32::from(v)))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)?.map(SqlValue::Int32)
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)?.map(SqlValue::Int64)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)?
            .map(|v| SqlValue::Float64(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)?.map(SqlValue::Float64)
    } else if <String as FromSql<'_>>::accepts(ty) {
        row.try_get::<_, Option<String>>(index)?.map(SqlValue::Text)
    } else {
        return Err(Box::new(ValueError::UnsupportedType {
            column: column.to_string(),
            type_name: ty.name().to_string(),
        }));
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

/// Accepts any parameter type and converts to what the server declared, so
/// coercion happens here rather than at the call site.
impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Text(value) => value.to_sql_checked(ty, out),
            SqlValue::Bool(value) => value.to_sql_checked(ty, out),
            SqlValue::Int32(value) => integer_to_sql(i64::from(*value), ty, out),
            SqlValue::Int64(value) => integer_to_sql(*value, ty, out),
            SqlValue::Float64(value) => {
                if *ty == Type::FLOAT4 {
                    (*value as f32).to_sql_checked(ty, out)
                } else {
                    value.to_sql_checked(ty, out)
                }
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer_to_sql(
    value: i64,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if *ty == Type::INT2 {
        i16::try_from(value)?.to_sql_checked(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(value)?.to_sql_checked(ty, out)
    } else if *ty == Type::FLOAT8 {
        (value as f64).to_sql_checked(ty, out)
    } else {
        value.to_sql_checked(ty, out)
    }
}
