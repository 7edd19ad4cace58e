use rook_core::{AsValue, ColumnSpec, Connection, DropBehavior, Query, Schema};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn transaction<C: Connection>(connection: &mut C) {
    let _lock = MUTEX.lock().await;

    // Setup
    {
        let mut schema = Schema::new(&mut *connection).expect("Unknown dialect");
        schema
            .drop_table("ledger", DropBehavior::Cascade, true)
            .await
            .expect("Failed to drop ledger");
        schema
            .create_table(
                "ledger",
                &[
                    ("id", ColumnSpec::primary()),
                    ("amount", ColumnSpec::decimal(10, 2)),
                ],
                true,
            )
            .await
            .expect("Failed to create ledger");
    }

    connection
        .begin()
        .await
        .expect("Could not begin a transaction");
    for amount in [120, -45] {
        connection
            .insert("ledger", &[("amount".into(), amount.as_value())], "id")
            .await
            .expect("Failed to insert an entry");
    }
    connection
        .commit()
        .await
        .expect("Failed to commit the transaction");
    assert_eq!(Query::new("ledger").count(connection).await.unwrap(), 2);

    connection
        .begin()
        .await
        .expect("Could not begin a transaction");
    connection
        .insert("ledger", &[("amount".into(), 999.as_value())], "id")
        .await
        .expect("Failed to insert an entry");
    assert_eq!(Query::new("ledger").count(connection).await.unwrap(), 3);
    connection
        .rollback()
        .await
        .expect("Failed to roll back the transaction");
    assert_eq!(Query::new("ledger").count(connection).await.unwrap(), 2);
}
