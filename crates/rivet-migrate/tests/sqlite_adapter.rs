//! End-to-end tests against an in-memory SQLite database.

use rivet_core::schema::{CopyMode, ForeignKeyAction, IndexKind, IndexMethod};
use rivet_migrate::prelude::*;

async fn adapter() -> Adapter {
    Adapter::connect_url("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database")
}

fn posts_table() -> MigrationTable {
    MigrationTable::new("posts")
        .add_column("title", ColumnType::String, ColumnSettings::new())
        .add_column("views", ColumnType::Integer, ColumnSettings::new())
        .add_index(&["title"], IndexKind::Unique, IndexMethod::Default, None)
        .unwrap()
        .create()
}

fn post(title: &str, views: i64) -> Row {
    Row::new().set("title", title).set("views", views)
}

fn titles(records: &[Record]) -> Vec<SqlValue> {
    records
        .iter()
        .map(|r| r.get("title").cloned().unwrap_or(SqlValue::Null))
        .collect()
}

#[tokio::test]
async fn crud_round_trip() {
    let mut db = adapter().await;
    db.apply(&posts_table()).await.unwrap();

    let last_id = db
        .insert(
            "posts",
            vec![post("first", 3), post("second", 12), post("third", 7)],
        )
        .await
        .unwrap();
    assert_eq!(last_id, Some(3));

    let top = db
        .fetch_all(
            "posts",
            FetchOptions::new()
                .columns(&["title", "views"])
                .order(Orders::new().by("views", "desc"))
                .limit(2),
        )
        .await
        .unwrap();
    assert_eq!(
        titles(&top),
        [SqlValue::Text("second".into()), SqlValue::Text("third".into())]
    );
    assert_eq!(top[0].columns().collect::<Vec<_>>(), ["title", "views"]);

    let updated = db
        .update(
            "posts",
            Row::new().set("views", 0),
            Conditions::new(),
            Some("views > 5"),
        )
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = db
        .delete("posts", Conditions::new().any("id", [1, 2]), None)
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let remaining = db.select("SELECT title, views FROM posts").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].get("views"), Some(&SqlValue::Int(0)));
}

#[tokio::test]
async fn unique_index_is_enforced() {
    let mut db = adapter().await;
    db.apply(&posts_table()).await.unwrap();
    db.insert("posts", post("dup", 1)).await.unwrap();

    let err = db.insert("posts", post("dup", 2)).await.unwrap_err();
    match err {
        MigrateError::QueryExecution { message, query, .. } => {
            assert!(message.contains("UNIQUE"), "{message}");
            assert_eq!(
                query.as_deref(),
                Some("INSERT INTO \"posts\" (\"title\", \"views\") VALUES (:title, :views)")
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn alter_rename_copy_and_drop() {
    let mut db = adapter().await;
    db.apply(&posts_table()).await.unwrap();
    db.insert("posts", post("kept", 1)).await.unwrap();

    let alter = MigrationTable::new("posts")
        .add_column("published", ColumnType::Boolean, ColumnSettings::new().nullable())
        .save();
    db.apply(&alter).await.unwrap();
    db.insert("posts", post("published", 2).set("published", true))
        .await
        .unwrap();

    let published = db
        .fetch(
            "posts",
            FetchOptions::new().filter(Conditions::new().eq("published", true)),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.get("title"), Some(&SqlValue::Text("published".into())));
    assert_eq!(published.get("published"), Some(&SqlValue::Int(1)));

    db.apply(&MigrationTable::new("posts").rename("articles"))
        .await
        .unwrap();
    db.apply(&MigrationTable::new("articles").copy("articles_backup", CopyMode::StructureAndData))
        .await
        .unwrap();

    let backup = db.select("SELECT * FROM articles_backup ORDER BY id").await.unwrap();
    assert_eq!(
        titles(&backup),
        [SqlValue::Text("kept".into()), SqlValue::Text("published".into())]
    );

    db.apply(&MigrationTable::new("articles_backup").drop())
        .await
        .unwrap();
    let err = db.select("SELECT * FROM articles_backup").await.unwrap_err();
    assert!(matches!(err, MigrateError::QueryExecution { .. }));
}

#[tokio::test]
async fn foreign_keys_are_created() {
    let mut db = adapter().await;
    db.apply(&posts_table()).await.unwrap();

    let comments = MigrationTable::new("comments")
        .add_column("post_id", ColumnType::Integer, ColumnSettings::new())
        .add_column("body", ColumnType::Text, ColumnSettings::new())
        .add_foreign_key(
            &["post_id"],
            "posts",
            &["id"],
            ForeignKeyAction::Cascade,
            ForeignKeyAction::Default,
        )
        .unwrap()
        .create();
    assert_eq!(db.apply(&comments).await.unwrap(), 1);

    let schema = db
        .select("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'comments'")
        .await
        .unwrap();
    let Some(SqlValue::Text(sql)) = schema[0].get("sql") else {
        panic!("missing schema for comments: {schema:?}");
    };
    assert!(
        sql.contains("CONSTRAINT \"comments_post_id\" FOREIGN KEY (\"post_id\") REFERENCES \"posts\" (\"id\") ON DELETE CASCADE"),
        "{sql}"
    );
}

#[tokio::test]
async fn failing_statement_rolls_back_earlier_ones() {
    let mut db = adapter().await;
    let tags = MigrationTable::new("tags")
        .add_column("label", ColumnType::String, ColumnSettings::new())
        .add_index(&["label"], IndexKind::Normal, IndexMethod::Default, Some("dup"))
        .unwrap()
        .create();
    db.apply(&tags).await.unwrap();

    // Index names are schema-wide in SQLite, so the second statement fails
    // after the CREATE TABLE has run.
    let posts = MigrationTable::new("posts")
        .add_column("title", ColumnType::String, ColumnSettings::new())
        .add_index(&["title"], IndexKind::Unique, IndexMethod::Default, Some("dup"))
        .unwrap()
        .create();
    assert_eq!(db.sql_for(&posts).unwrap().len(), 2);

    let err = db.apply(&posts).await.unwrap_err();
    match err {
        MigrateError::QueryExecution { query, .. } => {
            assert_eq!(
                query.as_deref(),
                Some("CREATE UNIQUE INDEX \"dup\" ON \"posts\" (\"title\")")
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    let tables = db
        .select("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .await
        .unwrap();
    let names: Vec<SqlValue> = tables
        .iter()
        .map(|r| r.get("name").cloned().unwrap_or(SqlValue::Null))
        .collect();
    assert!(names.contains(&SqlValue::Text("tags".into())), "{names:?}");
    assert!(!names.contains(&SqlValue::Text("posts".into())), "{names:?}");
}

#[tokio::test]
async fn unsupported_change_fails_before_touching_database() {
    let mut db = adapter().await;
    db.apply(&posts_table()).await.unwrap();

    let change = MigrationTable::new("posts")
        .change_column("views", "view_count", ColumnType::BigInteger, ColumnSettings::new())
        .save();
    let err = db.apply(&change).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Core(rivet_core::Error::Unsupported { .. })
    ));

    let records = db.select("SELECT views FROM posts").await.unwrap();
    assert!(records.is_empty());
}
