use rook_core::{
    AsValue, ColumnSpec, Connection, Direction, DropBehavior, Fetched, JoinType, Query, Schema,
    Value,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn query<C: Connection>(connection: &mut C) {
    let _lock = MUTEX.lock().await;

    // Setup
    {
        let mut schema = Schema::new(&mut *connection).expect("Unknown dialect");
        for table in ["pupil", "house"] {
            schema
                .drop_table(table, DropBehavior::Cascade, true)
                .await
                .expect("Failed to drop the table");
        }
        schema
            .create_table(
                "house",
                &[
                    ("id", ColumnSpec::primary()),
                    ("name", ColumnSpec::string().length(40)),
                ],
                true,
            )
            .await
            .expect("Failed to create house");
        schema
            .create_table(
                "pupil",
                &[
                    ("id", ColumnSpec::primary()),
                    ("name", ColumnSpec::string().length(40).not_null()),
                    ("age", ColumnSpec::integer()),
                    ("house_id", ColumnSpec::integer()),
                ],
                true,
            )
            .await
            .expect("Failed to create pupil");
    }
    let mut houses = Vec::new();
    for name in ["north", "south"] {
        let key = connection
            .insert("house", &[("name".into(), name.as_value())], "id")
            .await
            .expect("Failed to insert a house")
            .expect("The house should get a key");
        houses.push(key);
    }
    let pupils = [
        ("Ada", 12, &houses[0]),
        ("Brook", 14, &houses[0]),
        ("Cyd", 14, &houses[1]),
        ("Dorian", 17, &houses[1]),
        ("Emi", 11, &houses[1]),
    ];
    for (name, age, house) in pupils {
        connection
            .insert(
                "pupil",
                &[
                    ("name".into(), name.as_value()),
                    ("age".into(), age.as_value()),
                    ("house_id".into(), house.clone()),
                ],
                "id",
            )
            .await
            .expect("Failed to insert a pupil");
    }

    // Count and filters
    assert_eq!(Query::new("pupil").count(connection).await.unwrap(), 5);
    assert_eq!(
        Query::new("pupil")
            .filter(("age", ">=", 14))
            .count(connection)
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        Query::new("pupil")
            .filter(("age", "<", 12))
            .or_filter(("name", "=", "Dorian"))
            .count(connection)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        Query::new("pupil")
            .filter_raw("`age` BETWEEN 12 AND 14")
            .count(connection)
            .await
            .unwrap(),
        3
    );

    // Single column fetch yields scalars
    let names = Query::create("name", "pupil")
        .order_by("name", Direction::Asc)
        .limit(2)
        .offset(1)
        .fetch(connection)
        .await
        .expect("Failed to fetch names");
    assert_eq!(
        names,
        Fetched::Scalars(vec!["Brook".as_value(), "Cyd".as_value()])
    );

    // Several columns yield models
    let oldest = Query::new("pupil")
        .order_by_desc("age")
        .order_by("name", Direction::Asc)
        .fetch(connection)
        .await
        .expect("Failed to fetch pupils")
        .into_models()
        .expect("Wildcard queries return models");
    assert_eq!(oldest.len(), 5);
    assert_eq!(oldest[0].field("name"), Some(&"Dorian".as_value()));
    assert_eq!(oldest[1].field("name"), Some(&"Brook".as_value()));
    assert!(oldest.iter().all(|v| v.is_loaded() && v.key().is_some()));

    let model = Query::new("pupil")
        .filter(("name", "=", "Emi"))
        .one(connection)
        .await
        .expect("Failed to query Emi")
        .expect("Emi exists");
    assert_eq!(model.table(), "pupil");
    assert_eq!(model.field("age").and_then(Value::as_i64), Some(11));
    assert!(
        Query::new("pupil")
            .filter(("name", "=", "Nobody"))
            .one(connection)
            .await
            .expect("Failed to query")
            .is_none()
    );

    // Pairs and grouping
    let ages = Query::create(["age", "COUNT(*)"], "pupil")
        .group_by("age")
        .order_by("age", Direction::Asc)
        .pairs(connection)
        .await
        .expect("Failed to group by age");
    assert_eq!(
        ages,
        [
            (11.as_value(), 1.as_value()),
            (12.as_value(), 1.as_value()),
            (14.as_value(), 2.as_value()),
            (17.as_value(), 1.as_value()),
        ]
    );
    let distinct = Query::create("age", "pupil")
        .distinct(true)
        .fetch(connection)
        .await
        .expect("Failed to select distinct ages");
    assert_eq!(distinct.len(), 4);

    // Joins
    let south = Query::create("pupil.name", "pupil")
        .join("house", "house.id", "=", "pupil.house_id")
        .join_as(JoinType::Inner, "house", "house.id", "=", "pupil.house_id")
        .filter(("house.name", "=", "south"))
        .order_by("pupil.name", Direction::Asc)
        .fetch(connection)
        .await
        .expect("Failed to join houses")
        .into_scalars()
        .expect("A single column was selected");
    assert_eq!(
        south,
        ["Cyd".as_value(), "Dorian".as_value(), "Emi".as_value()]
    );

    // Updates and deletes through the executor
    let ada = Query::create("id", "pupil")
        .filter(("name", "=", "Ada"))
        .column(connection)
        .await
        .expect("Failed to find Ada")
        .expect("Ada exists");
    assert_eq!(
        connection
            .update("pupil", &[("age".into(), 13.as_value())], &ada, "id")
            .await
            .expect("Failed to update Ada"),
        1
    );
    assert_eq!(
        Query::create("age", "pupil")
            .filter(("id", "=", ada.clone()))
            .column(connection)
            .await
            .unwrap(),
        Some(13.as_value())
    );
    assert_eq!(
        connection
            .delete("pupil", &ada, "id")
            .await
            .expect("Failed to delete Ada"),
        1
    );
    assert_eq!(Query::new("pupil").count(connection).await.unwrap(), 4);
}
