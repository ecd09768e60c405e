mod connection;
mod cursor;
mod provider;

pub use connection::{Connection, Statement};
pub use cursor::RowCursor;
pub use provider::ConnectionProvider;
