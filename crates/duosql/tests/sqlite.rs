use duosql::{
    BackendKind, Database, DatabaseConfig, DatabaseOptions, DbError, Operation, Record, Value,
    get_database, record, sql,
};

async fn contents_db() -> Database {
    let db = get_database(DatabaseOptions::new()).await.unwrap();
    db.execute("CREATE TABLE contents (id INTEGER PRIMARY KEY, title TEXT, body TEXT)")
        .await
        .unwrap();
    db
}

#[tokio::test]
async fn options_without_host_open_in_memory_sqlite() {
    let db = get_database(DatabaseOptions::new()).await.unwrap();
    assert_eq!(db.kind(), BackendKind::Sqlite);
    assert!(db.client().as_sqlite().is_some());
    assert!(db.client().as_postgres().is_none());
}

#[tokio::test]
async fn insert_then_list() {
    let db = contents_db().await;

    let res = db
        .insert("contents", record! { "title" => "hello", "body" => "world" })
        .await
        .unwrap();
    assert_eq!(res.operation, Operation::Insert);
    assert_eq!(res.affected, 1);

    let rows = db.list("contents", &record! { "title" => "hello" }).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("title"), Some(&Value::from("hello")));
    assert_eq!(rows[0].get("body"), Some(&Value::from("world")));
}

#[tokio::test]
async fn multi_row_insert_reports_every_row() {
    let db = contents_db().await;

    let res = db
        .insert(
            "contents",
            vec![
                record! { "title" => "hello", "body" => "world" },
                record! { "title" => "hi", "body" => "universe" },
            ],
        )
        .await
        .unwrap();
    assert_eq!(res.affected, 2);

    let rows = db.list("contents", &Record::new()).await.unwrap();
    let titles: Vec<String> = rows
        .iter()
        .map(|r| r.try_get::<String>("title").unwrap())
        .collect();
    assert_eq!(titles, ["hello", "hi"]);
}

#[tokio::test]
async fn update_then_single() {
    let db = contents_db().await;
    db.insert(
        "contents",
        record! { "id" => 7, "title" => "hello", "body" => "world" },
    )
    .await
    .unwrap();

    let res = db
        .update(
            "contents",
            &record! { "id" => 7 },
            &record! { "title" => "hey", "body" => "there" },
        )
        .await
        .unwrap();
    assert_eq!(res.operation, Operation::Update);
    assert_eq!(res.affected, 1);

    let id = 7;
    let row = db
        .single(sql!("SELECT * FROM contents WHERE id = " {id}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.try_get::<i64>("id").unwrap(), 7);
    assert_eq!(row.try_get::<String>("title").unwrap(), "hey");
    assert_eq!(row.try_get::<String>("body").unwrap(), "there");
}

#[tokio::test]
async fn update_without_matches_affects_nothing() {
    let db = contents_db().await;
    let res = db
        .update("contents", &record! { "id" => 1 }, &record! { "title" => "x" })
        .await
        .unwrap();
    assert_eq!(res.affected, 0);
}

#[tokio::test]
async fn many_on_empty_table_is_empty() {
    let db = contents_db().await;
    let rows = db.many("SELECT * FROM contents").await.unwrap();
    assert!(rows.is_empty());
    assert!(db.single("SELECT * FROM contents").await.unwrap().is_none());
    assert!(db.pluck("SELECT title FROM contents").await.unwrap().is_none());
}

#[tokio::test]
async fn get_returns_first_match_or_none() {
    let db = contents_db().await;
    assert!(db.get("contents", &record! { "id" => 1 }).await.unwrap().is_none());

    db.insert("contents", record! { "id" => 1, "title" => "a", "body" => "b" })
        .await
        .unwrap();
    let row = db.get("contents", &record! { "id" => 1 }).await.unwrap().unwrap();
    assert_eq!(row.get("title"), Some(&Value::from("a")));
}

#[tokio::test]
async fn pluck_returns_first_column() {
    let db = contents_db().await;
    db.insert(
        "contents",
        vec![
            record! { "title" => "a", "body" => "x" },
            record! { "title" => "b", "body" => "x" },
        ],
    )
    .await
    .unwrap();

    let body = "x";
    let n = db
        .pluck(sql!("SELECT COUNT(*) FROM contents WHERE body = " {body}))
        .await
        .unwrap();
    assert_eq!(n, Some(Value::Int(2)));
}

#[tokio::test]
async fn short_aliases_match_long_forms() {
    let db = contents_db().await;

    let affected = db
        .xx(sql!("INSERT INTO contents (title, body) VALUES (" {"a"} ", " {"b"} ")"))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    assert_eq!(
        db.oo("SELECT * FROM contents").await.unwrap(),
        db.many("SELECT * FROM contents").await.unwrap()
    );
    assert_eq!(
        db.oO("SELECT * FROM contents").await.unwrap(),
        db.single("SELECT * FROM contents").await.unwrap()
    );
    assert_eq!(
        db.ox("SELECT title FROM contents").await.unwrap(),
        Some(Value::from("a"))
    );
}

#[tokio::test]
async fn execute_accepts_statements_that_return_rows() {
    let db = contents_db().await;

    let affected = db
        .xx(sql!("INSERT INTO contents (title, body) VALUES (" {"a"} ", " {"b"} ") RETURNING id"))
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(db.many("SELECT * FROM contents").await.unwrap().len(), 1);

    assert_eq!(db.execute("PRAGMA journal_mode").await.unwrap(), 0);
    assert_eq!(db.execute("SELECT * FROM contents").await.unwrap(), 0);

    let affected = db
        .execute(sql!("UPDATE contents SET body = " {"c"} " RETURNING id"))
        .await
        .unwrap();
    assert_eq!(affected, 1);
}

#[tokio::test]
async fn table_handle_scopes_crud() {
    let db = contents_db().await;
    let contents = db.table("contents");
    assert_eq!(contents.name(), "contents");

    contents
        .insert(record! { "id" => 3, "title" => "t", "body" => "b" })
        .await
        .unwrap();
    contents
        .update(&record! { "id" => 3 }, &record! { "body" => "changed" })
        .await
        .unwrap();

    let row = contents.get(&record! { "id" => 3 }).await.unwrap().unwrap();
    assert_eq!(row.get("body"), Some(&Value::from("changed")));
    assert_eq!(contents.list(&Record::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn hostile_values_are_stored_verbatim() {
    let db = contents_db().await;
    let title = "x'); DROP TABLE contents; --";
    db.insert("contents", record! { "title" => title, "body" => "b" })
        .await
        .unwrap();

    let row = db
        .single(sql!("SELECT title FROM contents WHERE title = " {title}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.try_get::<String>("title").unwrap(), title);
}

#[tokio::test]
async fn null_values_round_trip() {
    let db = contents_db().await;
    db.insert(
        "contents",
        record! { "id" => 1, "title" => "t", "body" => Option::<String>::None },
    )
    .await
    .unwrap();

    let row = db.get("contents", &record! { "id" => 1 }).await.unwrap().unwrap();
    assert_eq!(row.get("body"), Some(&Value::Null));
    assert_eq!(row.try_get::<Option<String>>("body").unwrap(), None);
}

#[tokio::test]
async fn malformed_inserts_fail_before_reaching_the_engine() {
    let db = contents_db().await;

    let err = db.insert("contents", Vec::<Record>::new()).await.unwrap_err();
    assert!(err.is_shape());

    let err = db
        .insert(
            "contents",
            vec![record! { "title" => "a" }, record! { "body" => "b" }],
        )
        .await
        .unwrap_err();
    assert!(err.is_shape());

    assert!(db.many("SELECT * FROM contents").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_requires_where_and_data() {
    let db = contents_db().await;
    let err = db
        .update("contents", &Record::new(), &record! { "title" => "x" })
        .await
        .unwrap_err();
    assert!(err.is_shape());

    let err = db
        .update("contents", &record! { "id" => 1 }, &Record::new())
        .await
        .unwrap_err();
    assert!(err.is_shape());
}

#[tokio::test]
async fn driver_errors_are_surfaced() {
    let db = contents_db().await;
    db.insert("contents", record! { "id" => 1, "title" => "a", "body" => "b" })
        .await
        .unwrap();

    let err = db
        .insert("contents", record! { "id" => 1, "title" => "c", "body" => "d" })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
    assert!(err.is_unique_violation());

    let err = db.many("SELECT * FROM nope").await.unwrap_err();
    assert!(!err.is_unique_violation());
}

#[tokio::test]
async fn file_database_persists_between_handles() {
    let path = std::env::temp_dir().join(format!("duosql-test-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let db = duosql::connect(DatabaseConfig::sqlite(&path)).await.unwrap();
        db.execute("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)")
            .await
            .unwrap();
        db.insert("kv", record! { "k" => "a", "v" => "1" }).await.unwrap();
    }

    let db = duosql::connect(DatabaseConfig::from_url(&format!("sqlite://{}", path.display())).unwrap())
        .await
        .unwrap();
    let v = db.pluck("SELECT v FROM kv").await.unwrap();
    assert_eq!(v, Some(Value::from("1")));

    drop(db);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn clones_share_the_connection() {
    let db = contents_db().await;
    let other = db.clone();
    other
        .insert("contents", record! { "title" => "shared", "body" => "b" })
        .await
        .unwrap();
    assert_eq!(db.many("SELECT * FROM contents").await.unwrap().len(), 1);
}
