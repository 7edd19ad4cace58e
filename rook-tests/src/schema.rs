use rook_core::{ColumnSpec, Connection, Dialect, DropBehavior, Query, Schema, Statement};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn schema<C: Connection>(connection: &mut C) {
    let _lock = MUTEX.lock().await;
    let mut schema = Schema::new(connection).expect("The driver should have a known dialect");

    // Setup
    schema
        .drop_table("shelf", DropBehavior::Cascade, true)
        .await
        .expect("Failed to drop shelf");
    schema
        .drop_table("bookshelf", DropBehavior::Cascade, true)
        .await
        .expect("Failed to drop bookshelf");
    assert!(!schema.table_exists("shelf").await);

    let preview = schema
        .create_table(
            "shelf",
            &[
                ("id", ColumnSpec::primary()),
                ("label", ColumnSpec::string().length(80).not_null()),
                ("capacity", ColumnSpec::integer().default_value(10)),
                ("public", ColumnSpec::boolean().default_value(true)),
            ],
            false,
        )
        .await
        .expect("Failed to preview shelf");
    assert!(
        preview
            .sql()
            .expect("A dry run returns the statement")
            .starts_with("CREATE TABLE ")
    );
    assert!(
        !schema.table_exists("shelf").await,
        "A dry run must not create the table"
    );

    schema
        .create_table(
            "shelf",
            &[
                ("id", ColumnSpec::primary()),
                ("label", ColumnSpec::string().length(80).not_null()),
                ("capacity", ColumnSpec::integer().default_value(10)),
                ("public", ColumnSpec::boolean().default_value(true)),
            ],
            true,
        )
        .await
        .expect("Failed to create shelf");
    assert!(schema.table_exists("shelf").await);

    schema
        .executor()
        .execute(Statement::new(
            "INSERT INTO `shelf` (`label`) VALUES ('kitchen')",
        ))
        .await
        .expect("Failed to insert a shelf");
    let row = Query::new("shelf")
        .one_row(schema.executor())
        .await
        .expect("Failed to query shelf")
        .expect("The shelf was just inserted");
    assert_eq!(
        row.get_column("capacity").and_then(|v| v.as_i64()),
        Some(10)
    );
    assert_eq!(
        row.get_column("public").and_then(|v| v.as_bool()),
        Some(true)
    );

    // Columns
    schema
        .add_column("shelf", "room", &ColumnSpec::string().length(40), true)
        .await
        .expect("Failed to add room");
    schema
        .rename_column("shelf", "room", "location", true)
        .await
        .expect("Failed to rename room");
    let location = Query::create("location", "shelf")
        .column(schema.executor())
        .await
        .expect("Failed to read location");
    assert_eq!(location, Some(Default::default()));
    schema
        .drop_column("shelf", "location", DropBehavior::Cascade, true)
        .await
        .expect("Failed to drop location");
    assert!(
        Query::create("location", "shelf")
            .column(schema.executor())
            .await
            .is_err(),
        "The column was dropped"
    );

    // Indexes and constraints
    schema
        .create_index("shelf", "label", true)
        .await
        .expect("Failed to create the label index");
    schema
        .drop_index("shelf", "label", DropBehavior::Cascade, true)
        .await
        .expect("Failed to drop the label index");
    schema
        .add_unique("shelf", "label", true)
        .await
        .expect("Failed to add the unique label");
    assert!(
        schema
            .executor()
            .execute(Statement::new(
                "INSERT INTO `shelf` (`label`) VALUES ('kitchen')",
            ))
            .await
            .is_err(),
        "Duplicate labels must be rejected"
    );
    schema
        .drop_unique("shelf", "label", DropBehavior::Cascade, true)
        .await
        .expect("Failed to drop the unique label");
    schema
        .executor()
        .execute(Statement::new(
            "INSERT INTO `shelf` (`label`) VALUES ('kitchen')",
        ))
        .await
        .expect("Duplicate labels are allowed again");
    assert_eq!(
        Query::new("shelf")
            .count(schema.executor())
            .await
            .expect("Failed to count shelves"),
        2
    );

    if schema.dialect() != Dialect::Sqlite {
        schema
            .drop_table("book", DropBehavior::Cascade, true)
            .await
            .expect("Failed to drop book");
        schema
            .create_table(
                "book",
                &[("id", ColumnSpec::primary()), ("shelf_id", ColumnSpec::integer())],
                true,
            )
            .await
            .expect("Failed to create book");
        schema
            .add_foreign_key("book", "shelf_id", "shelf", "id", true)
            .await
            .expect("Failed to add the book foreign key");
        schema
            .drop_foreign_key("book", "shelf_id", DropBehavior::Cascade, true)
            .await
            .expect("Failed to drop the book foreign key");
        schema
            .drop_table("book", DropBehavior::Cascade, true)
            .await
            .expect("Failed to drop book");
    } else {
        assert!(
            schema
                .add_foreign_key("book", "shelf_id", "shelf", "id", false)
                .await
                .is_err(),
            "Sqlite cannot add foreign keys to an existing table"
        );
    }

    // Tables
    schema
        .rename_table("shelf", "bookshelf", true)
        .await
        .expect("Failed to rename shelf");
    assert!(!schema.table_exists("shelf").await);
    assert!(schema.table_exists("bookshelf").await);
    schema
        .drop_table("bookshelf", DropBehavior::Cascade, true)
        .await
        .expect("Failed to drop bookshelf");
    assert!(!schema.table_exists("bookshelf").await);
}
