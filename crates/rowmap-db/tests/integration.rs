use rowmap_db::{Database, DbError, DbRuntimeSettings};
use rowmap_types::{FieldValue, RowValues};

fn users_db() -> Database {
    let db = Database::open_in_memory().expect("failed to open database");
    db.execute(
        "CREATE TABLE user (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            age TEXT
        );",
    )
    .expect("failed to create table");
    db
}

fn row(pairs: &[(&str, FieldValue)]) -> RowValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn insert_returns_row_id_and_omits_absent_columns() {
    let db = users_db();

    let id = db
        .insert("user", &row(&[("name", FieldValue::from("Alice"))]))
        .expect("insert should succeed");
    assert!(id >= 1);

    let rows = db
        .query("SELECT id, name, age FROM user WHERE id = ?1", &[FieldValue::Integer(id)])
        .expect("query should succeed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&FieldValue::from("Alice")));
    assert!(!rows[0].contains_key("age"), "NULL columns should be absent");
}

#[test]
fn constraint_violation_is_an_error() {
    let db = users_db();
    let alice = row(&[("name", FieldValue::from("Alice"))]);

    db.insert("user", &alice).expect("first insert should succeed");
    let err = db
        .insert("user", &alice)
        .expect_err("duplicate name should violate UNIQUE");
    assert!(matches!(err, DbError::Sqlite(_)));
}

#[test]
fn update_touches_only_matching_rows() {
    let db = users_db();
    db.insert("user", &row(&[("name", FieldValue::from("Alice"))]))
        .expect("insert alice");
    db.insert("user", &row(&[("name", FieldValue::from("Bob"))]))
        .expect("insert bob");

    let changed = db
        .update(
            "user",
            &row(&[("age", FieldValue::Integer(31))]),
            &row(&[("name", FieldValue::from("Bob"))]),
        )
        .expect("update should succeed");
    assert_eq!(changed, 1);

    let rows = db
        .query("SELECT name, age FROM user ORDER BY id", &[])
        .expect("query should succeed");
    assert!(!rows[0].contains_key("age"));
    // TEXT affinity stores the integer as its string form.
    assert_eq!(rows[1].get("age"), Some(&FieldValue::from("31")));
}

#[test]
fn file_backed_database_persists_across_handles() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("rowmap.db");
    let path = path.to_str().expect("temp path should be utf-8");

    {
        let db = Database::open(path, DbRuntimeSettings::default()).expect("open");
        db.execute("CREATE TABLE note (title TEXT);").expect("create");
        db.insert("note", &row(&[("title", FieldValue::from("hello"))]))
            .expect("insert");
        db.close().expect("close");
    }

    let db = Database::open(path, DbRuntimeSettings::default()).expect("reopen");
    assert_eq!(db.path(), path);
    let rows = db.query("SELECT title FROM note", &[]).expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("title"), Some(&FieldValue::from("hello")));

    let mode = db.query("PRAGMA journal_mode;", &[]).expect("journal mode");
    assert_eq!(
        mode[0].values().next(),
        Some(&FieldValue::from("wal")),
        "file databases should run in WAL mode"
    );
}
