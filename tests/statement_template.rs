mod common;

use std::error::Error;
use std::sync::Arc;
use std::thread;

use sqltemplate::drivers::{
    ExecutionKind, FailurePoint, InMemoryTestProvider, InMemoryTestResponseBuilder,
    InjectedFailure, LifecycleEvent,
};
use sqltemplate::{
    AllRows, BoxError, ConnectionProvider, DataAccessError, FirstRow, Row, RowCursor, RowError,
    SqlValue, Statement, StatementTemplate,
};

#[derive(Debug, PartialEq)]
struct Item {
    id: i64,
    name: String,
}

fn item(row: &Row) -> Result<Item, BoxError> {
    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn template_over(provider: &Arc<InMemoryTestProvider>) -> StatementTemplate {
    common::init_logs();
    StatementTemplate::new(Arc::clone(provider) as Arc<dyn ConnectionProvider>)
}

fn items_response() -> InMemoryTestResponseBuilder {
    InMemoryTestResponseBuilder::new()
        .columns(&["id", "name"])
        .row([SqlValue::Int64(7), SqlValue::from("x")])
        .row([SqlValue::Int64(8), SqlValue::from("y")])
}

fn injected_point(err: &DataAccessError) -> FailurePoint {
    err.cause()
        .downcast_ref::<InjectedFailure>()
        .map(|failure| failure.0)
        .expect("cause should be the injected failure")
}

#[test]
fn test_update_binds_positionally_and_releases() {
    let provider = Arc::new(InMemoryTestProvider::new());
    let template = template_over(&provider);

    template
        .update(
            "INSERT INTO users VALUES (?, ?, ?, ?)",
            &[
                SqlValue::from("alice"),
                SqlValue::from("secret"),
                SqlValue::Null,
                SqlValue::from(30),
            ],
        )
        .unwrap();

    provider.assert_last_statement(
        "INSERT INTO users VALUES (?, ?, ?, ?)",
        &[
            SqlValue::Text("alice".to_string()),
            SqlValue::Text("secret".to_string()),
            SqlValue::Null,
            SqlValue::Int32(30),
        ],
    );
    assert_eq!(provider.last_statement().unwrap().kind, ExecutionKind::Update);
    provider.assert_execution_count(1);
    assert_eq!(
        provider.events(),
        vec![
            LifecycleEvent::AcquireConnection,
            LifecycleEvent::PrepareStatement,
            LifecycleEvent::ReleaseStatement,
            LifecycleEvent::ReleaseConnection,
        ]
    );
}

#[test]
fn test_update_with_closure_binder() {
    let provider = Arc::new(InMemoryTestProvider::new());
    let template = template_over(&provider);

    template
        .execute_update(
            "UPDATE users SET name = ? WHERE id = ?",
            &|statement: &mut dyn Statement| -> Result<(), BoxError> {
                statement.set_object(2, &SqlValue::from(7))?;
                statement.set_object(1, &SqlValue::from("renamed"))
            },
        )
        .unwrap();

    provider.assert_last_statement(
        "UPDATE users SET name = ? WHERE id = ?",
        &[SqlValue::from("renamed"), SqlValue::Int32(7)],
    );
    provider.assert_resources_released();
}

#[test]
fn test_query_releases_cursor_statement_connection_in_order() {
    let provider = Arc::new(InMemoryTestProvider::new().with_response(items_response().build()));
    let template = template_over(&provider);

    let items = template
        .query_for_list("SELECT id, name FROM t", &[], item)
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(
        provider.events(),
        vec![
            LifecycleEvent::AcquireConnection,
            LifecycleEvent::PrepareStatement,
            LifecycleEvent::OpenCursor,
            LifecycleEvent::ReleaseCursor,
            LifecycleEvent::ReleaseStatement,
            LifecycleEvent::ReleaseConnection,
        ]
    );
}

#[test]
fn test_all_rows_keeps_row_order() {
    let provider = Arc::new(InMemoryTestProvider::new().with_response(items_response().build()));
    let template = template_over(&provider);

    let items = template
        .query("SELECT id, name FROM t", &[], &AllRows::new(item))
        .unwrap();

    assert_eq!(
        items,
        vec![
            Item {
                id: 7,
                name: "x".to_string()
            },
            Item {
                id: 8,
                name: "y".to_string()
            },
        ]
    );
}

#[test]
fn test_all_rows_on_empty_result_is_empty() {
    let provider = Arc::new(InMemoryTestProvider::new().with_response(
        InMemoryTestResponseBuilder::new()
            .columns(&["id", "name"])
            .build(),
    ));
    let template = template_over(&provider);

    let items = template
        .query_for_list("SELECT id, name FROM t WHERE id = ?", &[SqlValue::from(999)], item)
        .unwrap();

    assert!(items.is_empty());
    provider.assert_resources_released();
}

#[test]
fn test_first_row_mapper() {
    let provider = Arc::new(InMemoryTestProvider::new().with_responses([
        items_response().build(),
        InMemoryTestResponseBuilder::new().columns(&["id", "name"]).build(),
    ]));
    let template = template_over(&provider);

    let first = template
        .execute_query("SELECT id, name FROM t", None, &FirstRow::new(item))
        .unwrap();
    let none = template
        .execute_query("SELECT id, name FROM t", None, &FirstRow::new(item))
        .unwrap();

    assert_eq!(
        first,
        Some(Item {
            id: 7,
            name: "x".to_string()
        })
    );
    assert_eq!(none, None);
    provider.assert_execution_count(2);
    provider.assert_resources_released();
}

#[test]
fn test_query_for_object_runs_one_query() {
    let provider = Arc::new(
        InMemoryTestProvider::new()
            .with_response(items_response().build())
            .with_response(InMemoryTestResponseBuilder::new().columns(&["id", "name"]).build()),
    );
    let template = template_over(&provider);

    let found = template
        .query_for_object("SELECT id, name FROM t WHERE id > ?", &[SqlValue::from(0)], item)
        .unwrap();
    assert_eq!(found.map(|i| i.id), Some(7));
    provider.assert_execution_count(1);
    provider.clear();

    let missing = template
        .query_for_object("SELECT id, name FROM t WHERE id = ?", &[SqlValue::from(999)], item)
        .unwrap();
    assert!(missing.is_none());
    provider.assert_execution_count(1);
    provider.assert_last_statement("SELECT id, name FROM t WHERE id = ?", &[SqlValue::from(999)]);
    assert_eq!(provider.recorded_statements()[0].kind, ExecutionKind::Query);
    provider.assert_resources_released();
}

#[test]
fn test_query_batch_runs_without_parameters() {
    let provider = Arc::new(InMemoryTestProvider::new().with_response(items_response().build()));
    let template = template_over(&provider);

    let names = template
        .execute_query_batch("SELECT id, name FROM t", |row| Ok(row.get::<String>("name")?))
        .unwrap();

    assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
    provider.assert_last_statement("SELECT id, name FROM t", &[]);
}

#[test]
fn test_cursor_mapper_sees_column_names() {
    let provider = Arc::new(InMemoryTestProvider::new().with_response(items_response().build()));
    let template = template_over(&provider);

    let columns = template
        .execute_query(
            "SELECT id, name FROM t",
            None,
            &|cursor: &mut dyn RowCursor| -> Result<Vec<String>, BoxError> {
                Ok(cursor.columns().to_vec())
            },
        )
        .unwrap();

    assert_eq!(columns, vec!["id".to_string(), "name".to_string()]);
    provider.assert_resources_released();
}

#[test]
fn test_acquire_failure_is_connection_unavailable() {
    let provider = Arc::new(InMemoryTestProvider::new().failing_at(FailurePoint::Acquire));
    let template = template_over(&provider);

    let err = template.update("DELETE FROM t", &[]).unwrap_err();

    assert!(matches!(err, DataAccessError::ConnectionUnavailable(_)));
    assert_eq!(injected_point(&err), FailurePoint::Acquire);
    assert!(provider.events().is_empty());
    provider.assert_execution_count(0);
}

#[test]
fn test_prepare_failure_releases_connection() {
    let provider = Arc::new(InMemoryTestProvider::new().failing_at(FailurePoint::Prepare));
    let template = template_over(&provider);

    let err = template
        .query_for_list("SELEC broken", &[], item)
        .unwrap_err();

    assert!(matches!(err, DataAccessError::Statement(_)));
    assert_eq!(injected_point(&err), FailurePoint::Prepare);
    assert_eq!(
        provider.events(),
        vec![
            LifecycleEvent::AcquireConnection,
            LifecycleEvent::ReleaseConnection
        ]
    );
}

#[test]
fn test_bind_failure_on_update_releases_statement_and_connection() {
    let provider = Arc::new(InMemoryTestProvider::new().failing_at(FailurePoint::Bind));
    let template = template_over(&provider);

    let err = template
        .update("UPDATE t SET name = ?", &[SqlValue::from("z")])
        .unwrap_err();

    assert!(matches!(err, DataAccessError::Statement(_)));
    assert_eq!(injected_point(&err), FailurePoint::Bind);
    provider.assert_execution_count(0);
    assert_eq!(provider.count(LifecycleEvent::AcquireConnection), 1);
    assert_eq!(provider.count(LifecycleEvent::ReleaseConnection), 1);
    assert_eq!(provider.count(LifecycleEvent::ReleaseStatement), 1);
    provider.assert_resources_released();
}

#[test]
fn test_closure_binder_error_is_wrapped() {
    let provider = Arc::new(InMemoryTestProvider::new());
    let template = template_over(&provider);

    let err = template
        .execute_update(
            "UPDATE t SET name = ?",
            &|_: &mut dyn Statement| -> Result<(), BoxError> { Err("no value to bind".into()) },
        )
        .unwrap_err();

    assert!(matches!(err, DataAccessError::Statement(_)));
    assert_eq!(err.source().unwrap().to_string(), "no value to bind");
    provider.assert_resources_released();
}

#[test]
fn test_execute_failure_releases_everything() {
    let provider = Arc::new(InMemoryTestProvider::new().failing_at(FailurePoint::Execute));
    let template = template_over(&provider);

    let update_err = template.update("DELETE FROM t", &[]).unwrap_err();
    let query_err = template
        .query_for_list("SELECT id, name FROM t", &[], item)
        .unwrap_err();

    for err in [&update_err, &query_err] {
        assert!(matches!(err, DataAccessError::Statement(_)));
        assert_eq!(injected_point(err), FailurePoint::Execute);
    }
    assert_eq!(provider.count(LifecycleEvent::OpenCursor), 0);
    provider.assert_resources_released();
}

#[test]
fn test_mapper_failure_releases_everything() {
    let provider = Arc::new(InMemoryTestProvider::new().with_response(items_response().build()));
    let template = template_over(&provider);

    let err = template
        .query_for_list("SELECT id, name FROM t", &[], |row| {
            Ok(row.get::<String>("email")?)
        })
        .unwrap_err();

    assert!(matches!(err, DataAccessError::Mapping(_)));
    assert_eq!(err.cause().to_string(), "Column not found: email");
    provider.assert_resources_released();
}

#[test]
fn test_row_shorter_than_columns_is_mapping_error() {
    let provider = Arc::new(
        InMemoryTestProvider::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id", "name"])
                .row([SqlValue::from(1)])
                .build(),
        ),
    );
    let template = template_over(&provider);

    let err = template
        .query_for_list("SELECT id, name FROM t", &[], |row| {
            Ok(row.get::<String>("name")?)
        })
        .unwrap_err();

    assert!(matches!(err, DataAccessError::Mapping(_)));
    assert_eq!(
        err.cause().downcast_ref::<RowError>(),
        Some(&RowError::ColumnIndexOutOfRange { index: 1, len: 1 })
    );
    provider.assert_resources_released();
}

#[test]
fn test_cursor_failure_is_mapping_error() {
    let provider = Arc::new(
        InMemoryTestProvider::new()
            .with_response(items_response().build())
            .failing_at(FailurePoint::Advance),
    );
    let template = template_over(&provider);

    let err = template
        .query_for_list("SELECT id, name FROM t", &[], item)
        .unwrap_err();

    assert!(matches!(err, DataAccessError::Mapping(_)));
    assert_eq!(injected_point(&err), FailurePoint::Advance);
    provider.assert_resources_released();
}

#[test]
fn test_each_call_acquires_its_own_connection() {
    let provider = Arc::new(
        InMemoryTestProvider::new().with_default_response(items_response().build()),
    );
    let template = template_over(&provider);

    thread::scope(|scope| {
        for _ in 0..4 {
            let template = template.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    let items = template
                        .query_for_list("SELECT id, name FROM t", &[], item)
                        .unwrap();
                    assert_eq!(items.len(), 2);
                }
            });
        }
    });

    provider.assert_execution_count(40);
    assert_eq!(provider.count(LifecycleEvent::AcquireConnection), 40);
    assert_eq!(provider.count(LifecycleEvent::ReleaseConnection), 40);
    assert_eq!(provider.count(LifecycleEvent::ReleaseCursor), 40);
}
