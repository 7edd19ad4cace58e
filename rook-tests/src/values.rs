use rook_core::{AsValue, ColumnSpec, Connection, DropBehavior, Query, Schema};
use rust_decimal::Decimal;
use std::sync::LazyLock;
use time::{PrimitiveDateTime, macros::datetime};
use tokio::sync::Mutex;
use uuid::Uuid;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn values<C: Connection>(connection: &mut C) {
    let _lock = MUTEX.lock().await;

    // Setup
    {
        let mut schema = Schema::new(&mut *connection).expect("Unknown dialect");
        schema
            .drop_table("sample", DropBehavior::Cascade, true)
            .await
            .expect("Failed to drop sample");
        schema
            .create_table(
                "sample",
                &[
                    ("id", ColumnSpec::primary()),
                    ("price", ColumnSpec::decimal(10, 2)),
                    ("taken", ColumnSpec::datetime()),
                    ("token", ColumnSpec::string().length(36)),
                    ("note", ColumnSpec::string().length(64)),
                ],
                true,
            )
            .await
            .expect("Failed to create sample");
    }

    let price = Decimal::new(1250, 2);
    let taken = datetime!(2024-02-29 23:59:58);
    let token = Uuid::new_v4();
    let key = connection
        .insert(
            "sample",
            &[
                ("price".into(), price.as_value()),
                ("taken".into(), taken.as_value()),
                ("token".into(), token.as_value()),
                ("note".into(), None::<String>.as_value()),
            ],
            "id",
        )
        .await
        .expect("Failed to insert a sample")
        .expect("The insert returns the generated key");

    let row = Query::new("sample")
        .filter(("id", "=", key.clone()))
        .one_row(connection)
        .await
        .expect("Failed to read the sample")
        .expect("The sample exists");
    let field = |name: &str| {
        row.get_column(name)
            .cloned()
            .unwrap_or_else(|| panic!("The sample has no `{}`", name))
    };
    assert_eq!(
        Decimal::try_from_value(field("price")).expect("Price is a decimal"),
        price
    );
    assert_eq!(
        PrimitiveDateTime::try_from_value(field("taken")).expect("Taken is a timestamp"),
        taken
    );
    assert_eq!(
        Uuid::try_from_value(field("token")).expect("Token is a uuid"),
        token
    );
    assert_eq!(
        Option::<String>::try_from_value(field("note")).expect("Note is nullable text"),
        None
    );

    let found = Query::create("id", "sample")
        .filter(("token", "=", token))
        .column(connection)
        .await
        .expect("Failed to filter by token");
    assert_eq!(found, Some(key));
    assert_eq!(
        Query::new("sample")
            .filter(("taken", "<", datetime!(2024-01-01 00:00:00)))
            .count(connection)
            .await
            .expect("Failed to count old samples"),
        0
    );
    let stored = Query::create("token", "sample")
        .filter_raw("note IS NULL")
        .column(connection)
        .await
        .expect("Failed to read the token")
        .expect("The note is null");
    assert_eq!(Uuid::try_from_value(stored).ok(), Some(token));
}
