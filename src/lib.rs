//! sqltemplate - run parameterized SQL without the resource bookkeeping
//!
//! A [`StatementTemplate`] acquires a connection, prepares the statement,
//! binds parameters, executes, maps the result and releases everything in
//! reverse order, whatever step fails. Failures come back as one
//! [`DataAccessError`] carrying the original cause.
//!
//! # Example
//! ```ignore
//! use sqltemplate::{SqlValue, StatementTemplate};
//!
//! let template = StatementTemplate::sqlite("app.db");
//!
//! template.update(
//!     "INSERT INTO users (id, name) VALUES (?, ?)",
//!     &[SqlValue::from(7), SqlValue::from("x")],
//! )?;
//!
//! let names = template.query_for_list(
//!     "SELECT id, name FROM users WHERE id = ?",
//!     &[SqlValue::from(7)],
//!     |row| Ok(row.get::<String>("name")?),
//! )?;
//! ```

pub mod binder;
pub mod drivers;
pub mod error;
pub mod mapper;
pub mod template;
pub mod traits;
pub mod types;

// Re-export main types for convenient access
pub use binder::{ParameterBinder, PositionalBinder};
pub use error::{BindError, BoxError, DataAccessError, Result, RowError, ValueError};
pub use mapper::{AllRows, FirstRow, RowMapper};
pub use template::StatementTemplate;
pub use traits::{Connection, ConnectionProvider, RowCursor, Statement};
pub use types::{FromSqlValue, Row, SqlValue};
