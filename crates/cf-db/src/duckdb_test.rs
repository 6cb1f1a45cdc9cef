use super::*;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_new_handles_memory_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warehouse.duckdb");

    let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();
    db.close().unwrap();

    let reopened = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    assert!(reopened.relation_exists("t").await.unwrap());

    let memory = DuckDbBackend::new(":memory:").unwrap();
    assert!(!memory.relation_exists("t").await.unwrap());
}

#[tokio::test]
async fn test_execute_returns_affected_rows() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();
    let inserted = db
        .execute("INSERT INTO t SELECT * FROM range(4)")
        .await
        .unwrap();
    assert_eq!(inserted, 4);
}

#[tokio::test]
async fn test_execute_error_includes_sql() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.execute("INSERT INTO nope VALUES (1)").await.unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
    assert!(err.to_string().contains("INSERT INTO nope"));
}

#[tokio::test]
async fn test_query_scalar_types() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t (n INT, s VARCHAR, d DATE);
         INSERT INTO t VALUES (2, 'a', DATE '2024-01-01'), (3, NULL, DATE '2024-01-02');",
    )
    .await
    .unwrap();

    let count = db.query_scalar("SELECT COUNT(*) FROM t").await.unwrap();
    assert_eq!(count, ScalarValue::Integer(2));

    let sum = db.query_scalar("SELECT SUM(n) FROM t").await.unwrap();
    assert!(sum.matches(&ScalarValue::Integer(5)));

    let flag = db
        .query_scalar("SELECT COUNT(*) > 0 FROM t")
        .await
        .unwrap();
    assert_eq!(flag, ScalarValue::Boolean(true));

    let text = db
        .query_scalar("SELECT s FROM t WHERE n = 2")
        .await
        .unwrap();
    assert_eq!(text, ScalarValue::Text("a".to_string()));

    let max_date = db.query_scalar("SELECT MAX(d) FROM t").await.unwrap();
    assert!(max_date.matches(&ScalarValue::from("2024-01-02")));
}

#[tokio::test]
async fn test_query_scalar_null_and_no_rows() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (n INT)").await.unwrap();

    let sum = db.query_scalar("SELECT SUM(n) FROM t").await.unwrap();
    assert_eq!(sum, ScalarValue::Null);

    let none = db.query_scalar("SELECT n FROM t").await.unwrap();
    assert_eq!(none, ScalarValue::Null);
}

#[tokio::test]
async fn test_query_scalar_missing_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .query_scalar("SELECT COUNT(*) FROM missing_table")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[tokio::test]
async fn test_query_count() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .await
        .unwrap();

    let count = db.query_count("SELECT * FROM nums").await.unwrap();
    assert_eq!(count, 10);
}

#[tokio::test]
async fn test_relation_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(!db.relation_exists("staging_charts").await.unwrap());
    db.execute_batch("CREATE TABLE staging_charts (title VARCHAR)")
        .await
        .unwrap();
    assert!(db.relation_exists("staging_charts").await.unwrap());
    assert!(db.relation_exists("main.staging_charts").await.unwrap());
}

#[tokio::test]
async fn test_copy_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("rows.csv");
    std::fs::write(&csv, "id,name\n1,alpha\n2,beta\n").unwrap();

    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE rows_in (id INT, name VARCHAR)")
        .await
        .unwrap();
    db.copy_csv(&TableName::new("rows_in"), &csv).await.unwrap();

    assert_eq!(db.query_count("SELECT * FROM rows_in").await.unwrap(), 2);
    let name = db
        .query_scalar("SELECT name FROM rows_in WHERE id = 2")
        .await
        .unwrap();
    assert_eq!(name, ScalarValue::from("beta"));
}

#[tokio::test]
async fn test_copy_csv_missing_file() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE rows_in (id INT)")
        .await
        .unwrap();
    let err = db
        .copy_csv(&TableName::new("rows_in"), Path::new("/nonexistent/rows.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::CopyError { ref table, .. } if table == "rows_in"));
}

#[tokio::test]
async fn test_execute_rows_binds_nulls() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE pairs (k VARCHAR, v VARCHAR)")
        .await
        .unwrap();

    let rows = vec![
        vec![Some("a".to_string()), Some("1".to_string())],
        vec![Some("b".to_string()), None],
    ];
    let n = db
        .execute_rows("INSERT INTO pairs (k, v) VALUES (?, ?)", &rows)
        .await
        .unwrap();
    assert_eq!(n, 2);

    let nulls = db
        .query_scalar("SELECT COUNT(*) FROM pairs WHERE v IS NULL")
        .await
        .unwrap();
    assert_eq!(nulls, ScalarValue::Integer(1));
}

#[tokio::test]
async fn test_execute_rows_rolls_back_on_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE pairs (k VARCHAR NOT NULL)")
        .await
        .unwrap();

    let rows = vec![vec![Some("a".to_string())], vec![None]];
    let result = db
        .execute_rows("INSERT INTO pairs (k) VALUES (?)", &rows)
        .await;
    assert!(result.is_err());
    assert_eq!(db.query_count("SELECT * FROM pairs").await.unwrap(), 0);
}
