mod common;

use sql_helpers::get_or_create;
use sql_helpers::prelude::*;

use common::{Call, Reply, ScriptedClient, duplicate_key_error};

const SELECT: &str = "SELECT id FROM t WHERE k = ?1";
const INSERT: &str = "INSERT INTO t (k, v) VALUES (?1, ?2)";

fn params() -> Vec<RowValues> {
    vec!["key".into(), "value".into()]
}

fn select_call() -> Call {
    Call {
        op: "query",
        query: SELECT.into(),
        params: vec!["key".into()],
    }
}

fn insert_call() -> Call {
    Call {
        op: "exec",
        query: INSERT.into(),
        params: params(),
    }
}

#[tokio::test]
async fn existing_row_skips_the_insert() {
    let fake = ScriptedClient::new([Reply::row(vec![RowValues::Int(10)])]);
    let row = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap();
    assert_eq!(row.get_by_index(0), Some(&RowValues::Int(10)));
    assert_eq!(fake.calls(), vec![select_call()]);
}

#[tokio::test]
async fn missing_row_is_inserted_then_refetched() {
    let fake = ScriptedClient::new([
        Reply::empty(),
        Reply::inserted(11),
        Reply::row(vec![RowValues::Int(11)]),
    ]);
    let row = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap();
    assert_eq!(row.get_by_index(0), Some(&RowValues::Int(11)));
    assert_eq!(fake.calls(), vec![select_call(), insert_call(), select_call()]);
}

#[tokio::test]
async fn lost_race_refetches_the_winner() {
    let fake = ScriptedClient::new([
        Reply::empty(),
        Reply::Fail(duplicate_key_error()),
        Reply::row(vec![RowValues::Int(12)]),
    ]);
    let row = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap();
    assert_eq!(row.get_by_index(0), Some(&RowValues::Int(12)));
    assert_eq!(fake.ops(), ["query", "exec", "query"]);
}

#[tokio::test]
async fn driver_without_insert_ids_still_refetches() {
    let fake = ScriptedClient::new([
        Reply::empty(),
        Reply::affected(1),
        Reply::row(vec![RowValues::Int(13)]),
    ])
    .without_insert_ids();
    let row = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap();
    assert_eq!(row.get_by_index(0), Some(&RowValues::Int(13)));
}

#[tokio::test]
async fn missing_identity_is_an_error_when_the_driver_reports_ids() {
    let fake = ScriptedClient::new([Reply::empty(), Reply::affected(0)]);
    let err = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap_err();
    assert!(matches!(err, SqlHelperDbError::IdentityRetrieval(_)));
    assert_eq!(fake.ops(), ["query", "exec"]);
    assert_eq!(fake.remaining(), 0);
}

#[tokio::test]
async fn empty_params_fail_before_any_query() {
    let fake = ScriptedClient::default();
    let err = fake.get_or_create(SELECT, INSERT, &[]).await.unwrap_err();
    assert!(matches!(err, SqlHelperDbError::NoArguments));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn select_error_is_returned_verbatim() {
    let fake = ScriptedClient::new([Reply::Fail(SqlHelperDbError::Other("down".into()))]);
    let err = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap_err();
    assert!(matches!(err, SqlHelperDbError::Other(ref m) if m == "down"));
    assert_eq!(fake.ops(), ["query"]);
}

#[tokio::test]
async fn other_insert_errors_are_returned_verbatim() {
    let fake = ScriptedClient::new([
        Reply::empty(),
        Reply::Fail(SqlHelperDbError::Other("check constraint".into())),
    ]);
    let err = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap_err();
    assert!(matches!(err, SqlHelperDbError::Other(ref m) if m == "check constraint"));
    assert_eq!(fake.ops(), ["query", "exec"]);
}

#[tokio::test]
async fn refetch_miss_after_collision_surfaces_no_rows() {
    let fake = ScriptedClient::new([
        Reply::empty(),
        Reply::Fail(duplicate_key_error()),
        Reply::empty(),
    ]);
    let err = fake.get_or_create(SELECT, INSERT, &params()).await.unwrap_err();
    assert!(err.is_no_rows());
    assert_eq!(fake.remaining(), 0);
}

#[tokio::test]
async fn only_the_first_param_keys_the_lookup() {
    let fake = ScriptedClient::new([Reply::row(vec![RowValues::Int(1)])]);
    get_or_create(&fake, SELECT, INSERT, &["only".into(), RowValues::Null, RowValues::Int(3)])
        .await
        .unwrap();
    assert_eq!(fake.calls()[0].params, vec![RowValues::Text("only".into())]);
}

#[tokio::test]
async fn annotated_duplicate_from_a_decorated_store_still_counts() {
    let fake = ScriptedClient::new([
        Reply::empty(),
        Reply::Fail(duplicate_key_error()),
        Reply::row(vec![RowValues::Int(14)]),
    ]);
    // helpers run on the decorated layer, so the insert failure arrives annotated
    let scoped = ErrorDecorator::new(&fake, "inner");
    let row = get_or_create(&scoped, SELECT, INSERT, &params()).await.unwrap();
    assert_eq!(row.get_by_index(0), Some(&RowValues::Int(14)));
}
