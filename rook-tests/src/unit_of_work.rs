use rook_core::{
    AsValue, Cache, ColumnSpec, Condition, Connection, Criterion, DropBehavior, MemoryCache,
    ModelState, Query, Schema, UnitOfWork, Value, cache_key,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn unit_of_work<C: Connection>(connection: &mut C) {
    let _lock = MUTEX.lock().await;

    // Setup
    {
        let mut schema = Schema::new(&mut *connection).expect("Unknown dialect");
        for table in ["profile", "account"] {
            schema
                .drop_table(table, DropBehavior::Cascade, true)
                .await
                .expect("Failed to drop the table");
        }
        schema
            .create_table(
                "account",
                &[
                    ("id", ColumnSpec::primary()),
                    ("email", ColumnSpec::string().length(120).not_null()),
                    ("credits", ColumnSpec::integer().default_value(0)),
                ],
                true,
            )
            .await
            .expect("Failed to create account");
        schema
            .create_table(
                "profile",
                &[
                    ("id", ColumnSpec::primary()),
                    ("account_id", ColumnSpec::integer()),
                    ("nickname", ColumnSpec::string().length(40)),
                ],
                true,
            )
            .await
            .expect("Failed to create profile");
    }
    let cache = MemoryCache::new();

    // Create and flush
    let inserted = UnitOfWork::scope(&mut *connection, &cache, async |unit| {
        let account = unit.create("account");
        unit.set(account, "email", "ada@example.com")?
            .set(account, "credits", 3)?;
        assert_eq!(unit.model(account).map(|v| v.state()), Some(ModelState::New));
        assert_eq!(unit.pending(account).map(|v| v.len()), Some(2));
        unit.flush().await?;
        assert!(!unit.has_pending());
        let key = unit
            .model(account)
            .and_then(|v| v.key().cloned())
            .expect("The insert assigns the key");
        let profile = unit.create("profile");
        unit.set(profile, "account_id", key.clone())?
            .set(profile, "nickname", "ada")?;
        assert!(unit.has_pending());
        Ok(key)
    })
    .await
    .expect("Failed to create the account");
    assert_eq!(Query::new("account").count(connection).await.unwrap(), 1);
    assert_eq!(Query::new("profile").count(connection).await.unwrap(), 1);
    let key = Query::create("id", "account")
        .filter(("email", "=", "ada@example.com"))
        .column(connection)
        .await
        .unwrap()
        .expect("The account was inserted");
    assert_eq!(key, inserted);

    // Lazy load and cache
    let mut unit = UnitOfWork::new(&mut *connection, &cache);
    let account = unit.find("account", key.clone());
    assert_eq!(
        unit.model(account).map(|v| v.state()),
        Some(ModelState::Identified)
    );
    assert_eq!(
        unit.get(account, "id").await.expect("Failed to read the key"),
        Some(key.clone())
    );
    assert!(!unit.model(account).is_some_and(|v| v.is_loaded()));
    assert_eq!(
        unit.get(account, "credits")
            .await
            .expect("Failed to load the account"),
        Some(3.as_value())
    );
    assert!(unit.cache().exists(&cache_key("account", &key)));
    assert_eq!(
        unit.model(account).map(|v| v.state()),
        Some(ModelState::Loaded)
    );

    // Update evicts the cached row
    unit.set(account, "credits", 10)
        .expect("Failed to write credits");
    unit.set(account, "credits", 10)
        .expect("Failed to write credits");
    assert_eq!(unit.pending(account).map(|v| v.len()), Some(1));
    assert_eq!(
        unit.model(account).map(|v| v.state()),
        Some(ModelState::Dirty)
    );
    unit.flush().await.expect("Failed to update the account");
    assert_eq!(
        unit.model(account).map(|v| v.state()),
        Some(ModelState::Saved)
    );
    assert!(!unit.cache().exists(&cache_key("account", &key)));

    // Relationships
    let profile = unit
        .has(account, "profile")
        .await
        .expect("Failed to query the profile")
        .expect("The account has a profile");
    assert_eq!(
        unit.get(profile, "nickname").await.unwrap(),
        Some("ada".as_value())
    );
    let owner = unit
        .belongs_to(profile, "account", None)
        .await
        .expect("Failed to query the owner")
        .expect("The profile has an owner");
    assert_eq!(
        unit.get(owner, "credits").await.unwrap(),
        Some(10.as_value())
    );
    let keys = unit
        .has_many(account, "profile")
        .expect("The account is tracked")
        .fetch(unit.executor())
        .await
        .expect("Failed to fetch the profiles")
        .into_scalars()
        .expect("Only the keys are selected");
    assert_eq!(keys.len(), 1);

    // Criterion load
    let found = unit.create("account");
    assert!(
        unit.load(
            found,
            Some(Criterion::Conditions(vec![Condition::new(
                "email",
                "=",
                "ada@example.com",
            )])),
        )
        .await
        .expect("Failed to load by email")
    );
    assert_eq!(unit.model(found).and_then(|v| v.key()), Some(&key));
    let missing = unit.create("account");
    assert!(
        !unit
            .load(missing, Some(Criterion::key(9999)))
            .await
            .expect("Failed to load a missing account")
    );
    assert_eq!(
        unit.model(missing).map(|v| v.state()),
        Some(ModelState::New)
    );

    // Pending writes survive a lazy load
    let again = unit.find("account", key.clone());
    unit.set(again, "email", "lovelace@example.com")
        .expect("Failed to write email");
    assert_eq!(
        unit.get(again, "email").await.unwrap(),
        Some("lovelace@example.com".as_value())
    );
    unit.reset();
    assert!(!unit.has_pending());
    drop(unit);
    assert_eq!(
        Query::create("email", "account")
            .column(connection)
            .await
            .unwrap(),
        Some(Value::Text("ada@example.com".into()))
    );
}
