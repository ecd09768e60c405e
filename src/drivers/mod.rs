#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use self::in_memory_test::{
    ExecutionKind, FailurePoint, InMemoryTestProvider, InMemoryTestResponseBuilder,
    InjectedFailure, LifecycleEvent, RecordedStatement, ScriptedRows,
};
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresConnectionProvider;
#[cfg(feature = "sqlite")]
pub use self::sqlite::SqliteConnectionProvider;
