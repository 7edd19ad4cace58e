#[cfg(test)]
mod tests {
    use rook::{
        AsValue, Cache, Convention, MemoryCache, Model, ModelState, NoCache, RookError, RowLabeled,
        UnitOfWork, Value,
    };
    use rook_tests::{RecordingDriver, RecordingExecutor, init_logs, silent_logs};
    use std::sync::Mutex;

    /// Memory cache remembering the keys it was asked to delete.
    #[derive(Default)]
    struct SpyCache {
        inner: MemoryCache,
        deleted: Mutex<Vec<String>>,
    }

    impl Cache for SpyCache {
        fn set(&self, key: &str, row: RowLabeled) {
            self.inner.set(key, row)
        }
        fn get(&self, key: &str) -> Option<RowLabeled> {
            self.inner.get(key)
        }
        fn delete(&self, key: &str) -> bool {
            self.deleted.lock().unwrap().push(key.to_owned());
            self.inner.delete(key)
        }
        fn exists(&self, key: &str) -> bool {
            self.inner.exists(key)
        }
    }

    #[test]
    fn persist_collapses_writes() {
        let mut executor = RecordingExecutor::default();
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let user = unit.create("users");
        unit.persist(user, "name", "A")
            .persist(user, "name", "B")
            .persist(user, "age", 5);
        let changeset = unit.pending(user).expect("The user has pending writes");
        assert_eq!(
            changeset.fields(),
            [
                ("name".to_string(), "B".as_value()),
                ("age".to_string(), 5.as_value())
            ]
        );
        unit.reset();
        assert!(!unit.has_pending());
        assert!(unit.pending(user).is_none());
    }

    #[tokio::test]
    async fn insert_assigns_generated_key() {
        init_logs();
        let mut executor = RecordingExecutor::default();
        executor.respond_affected(1, Some(42));
        let cache = SpyCache::default();
        let mut unit = UnitOfWork::new(&mut executor, &cache);
        let user = unit.create("users");
        unit.set(user, "name", "Ada")
            .unwrap()
            .set(user, "age", 36)
            .unwrap();
        unit.flush().await.expect("Failed to flush");
        let model = unit.model(user).unwrap();
        assert_eq!(model.key(), Some(&Value::Int(42)));
        assert_eq!(model.state(), ModelState::Saved);
        assert!(!unit.has_pending());
        drop(unit);
        assert_eq!(
            executor.sql(),
            ["INSERT INTO `users` (`name`, `age`) VALUES (?, ?)"]
        );
        assert_eq!(
            executor.statements()[0].params,
            ["Ada".as_value(), 36.as_value()]
        );
        assert!(cache.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_returning() {
        let mut executor = RecordingExecutor::new(RecordingDriver::postgres());
        executor.respond_rows(&["id"], [vec![9]]);
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let user = unit.create("users");
        unit.set(user, "name", "Ada").unwrap();
        unit.flush().await.expect("Failed to flush");
        assert_eq!(unit.model(user).unwrap().key(), Some(&Value::Int(9)));
        drop(unit);
        assert_eq!(
            executor.sql(),
            [r#"INSERT INTO "users" ("name") VALUES (?) RETURNING "id""#]
        );
    }

    #[tokio::test]
    async fn update_evicts_cache() {
        let mut executor = RecordingExecutor::default();
        executor.respond_affected(1, None);
        let cache = SpyCache::default();
        let mut unit = UnitOfWork::new(&mut executor, &cache);
        let user = unit.find("users", 7);
        unit.set(user, "name", "Grace").unwrap();
        assert_eq!(
            unit.model(user).map(Model::state),
            Some(ModelState::Dirty)
        );
        unit.flush().await.expect("Failed to flush");
        drop(unit);
        assert_eq!(
            executor.sql(),
            ["UPDATE `users` SET `name` = ? WHERE `id` = ?"]
        );
        assert_eq!(
            executor.statements()[0].params,
            ["Grace".as_value(), 7.as_value()]
        );
        assert_eq!(*cache.deleted.lock().unwrap(), ["users7"]);
    }

    #[tokio::test]
    async fn flush_order_follows_creation() {
        let mut executor = RecordingExecutor::default();
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let first = unit.find("a", 1);
        let second = unit.find("b", 2);
        let third = unit.find("c", 3);
        unit.set(third, "x", 1).unwrap();
        unit.set(first, "x", 1).unwrap();
        unit.set(second, "x", 1).unwrap();
        unit.flush().await.unwrap();
        drop(unit);
        assert_eq!(
            executor.sql(),
            [
                "UPDATE `a` SET `x` = ? WHERE `id` = ?",
                "UPDATE `b` SET `x` = ? WHERE `id` = ?",
                "UPDATE `c` SET `x` = ? WHERE `id` = ?",
            ]
        );
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_flush() {
        let mut executor = RecordingExecutor::default();
        executor.fail("disk full").respond_affected(1, Some(3));
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let broken = unit.create("users");
        let fine = unit.create("users");
        unit.set(broken, "name", "A").unwrap();
        unit.set(fine, "name", "B").unwrap();
        silent_logs! {
            let error = unit.flush().await.unwrap_err();
            assert!(format!("{:#}", error).contains("disk full"));
        }
        assert!(!unit.has_pending(), "Failed changesets are not retried");
        assert_eq!(unit.model(broken).unwrap().state(), ModelState::New);
        assert_eq!(unit.model(fine).unwrap().key(), Some(&Value::Int(3)));
        unit.flush().await.expect("Nothing left to flush");
        drop(unit);
        assert_eq!(executor.statements().len(), 2);
    }

    #[tokio::test]
    async fn identical_writes_are_ignored() {
        let mut executor = RecordingExecutor::default();
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let user = unit.adopt(Model::hydrate(
            "users",
            RowLabeled::new(
                ["id".to_string(), "name".to_string()].into(),
                [7.as_value(), "Ada".as_value()].into(),
            ),
        ));
        unit.set(user, "name", "Ada").unwrap();
        assert!(!unit.has_pending());
        assert_eq!(unit.model(user).unwrap().state(), ModelState::Loaded);
        unit.set(user, "name", "Lovelace").unwrap();
        assert!(unit.has_pending());
        assert_eq!(
            unit.get(user, "name").await.unwrap(),
            Some("Lovelace".as_value())
        );
        unit.reset();
        drop(unit);
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn primary_key_read_does_not_load() {
        let mut executor = RecordingExecutor::default();
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let user = unit.find("users", 7);
        assert_eq!(unit.get(user, "id").await.unwrap(), Some(7.as_value()));
        drop(unit);
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn lazy_load_keeps_pending_writes() {
        let mut executor = RecordingExecutor::default();
        executor.respond_rows(
            &["id", "name", "age"],
            [vec![7.as_value(), "Ada".as_value(), 36.as_value()]],
        );
        let cache = MemoryCache::new();
        let mut unit = UnitOfWork::new(&mut executor, &cache);
        let user = unit.find("users", 7);
        unit.set(user, "name", "Grace").unwrap();
        assert_eq!(unit.get(user, "age").await.unwrap(), Some(36.as_value()));
        assert_eq!(
            unit.get(user, "name").await.unwrap(),
            Some("Grace".as_value())
        );
        assert_eq!(unit.pending(user).map(|v| v.len()), Some(1));
        assert!(cache.exists("users7"));
        unit.reset();
        drop(unit);
        assert_eq!(
            executor.sql(),
            ["SELECT * FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0"]
        );
    }

    #[tokio::test]
    async fn explicit_load_keeps_pending_writes() {
        let mut executor = RecordingExecutor::default();
        executor.respond_rows(
            &["id", "name"],
            [vec![7.as_value(), "Ada".as_value()]],
        );
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let user = unit.find("users", 7);
        unit.set(user, "name", "Grace").unwrap();
        assert!(unit.load(user, None).await.expect("Failed to load"));
        let model = unit.model(user).unwrap();
        assert_eq!(model.field("name"), Some(&"Grace".as_value()));
        assert_eq!(model.state(), ModelState::Dirty);
        assert_eq!(
            unit.get(user, "name").await.unwrap(),
            Some("Grace".as_value())
        );
        assert!(unit.has_pending());
        unit.reset();
        drop(unit);
        assert_eq!(executor.statements().len(), 1);
    }

    #[tokio::test]
    async fn belongs_to_follows_pending_foreign_key() {
        let mut executor = RecordingExecutor::default();
        executor
            .respond_rows(
                &["id", "users_id"],
                [vec![1.as_value(), 3.as_value()]],
            )
            .respond_rows(&["id"], [vec![5]])
            .respond_rows(
                &["id", "name"],
                [vec![5.as_value(), "Grace".as_value()]],
            );
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let post = unit.find("posts", 1);
        unit.set(post, "users_id", 5).unwrap();
        let owner = unit
            .belongs_to(post, "users", None)
            .await
            .expect("Failed to find the owner")
            .expect("The owner exists");
        assert_eq!(unit.model(owner).unwrap().key(), Some(&5.as_value()));
        let model = unit.model(post).unwrap();
        assert_eq!(model.field("users_id"), Some(&5.as_value()));
        assert_eq!(model.state(), ModelState::Dirty);
        assert_eq!(
            unit.pending(post).and_then(|v| v.get("users_id")),
            Some(&5.as_value())
        );
        unit.reset();
        drop(unit);
        assert_eq!(
            executor.sql(),
            [
                "SELECT * FROM `posts` WHERE `id` = ? LIMIT 1 OFFSET 0",
                "SELECT `id` FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0",
                "SELECT * FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0",
            ]
        );
        assert_eq!(executor.statements()[1].params, [5.as_value()]);
    }

    #[tokio::test]
    async fn scope_flushes_on_every_exit() {
        let mut executor = RecordingExecutor::default();
        executor.respond_affected(1, Some(1));
        let result = UnitOfWork::scope(&mut executor, &NoCache, async |unit| {
            let user = unit.create("users");
            unit.set(user, "name", "Ada")?;
            Err::<(), _>(rook::Error::msg("request aborted"))
        })
        .await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "request aborted",
            "The error of the scope wins"
        );
        assert_eq!(
            executor.sql(),
            ["INSERT INTO `users` (`name`) VALUES (?)"]
        );

        let mut executor = RecordingExecutor::default();
        executor.respond_affected(1, Some(5));
        let user = UnitOfWork::scope(&mut executor, &NoCache, async |unit| {
            let user = unit.create("users");
            unit.set(user, "name", "Ada")?;
            Ok(user)
        })
        .await
        .expect("The scope succeeds");
        assert_eq!(user.to_string(), "#0");
        assert_eq!(executor.statements().len(), 1);
    }

    #[tokio::test]
    async fn unknown_models() {
        let mut executor = RecordingExecutor::default();
        let mut unit = UnitOfWork::new(&mut executor, &NoCache);
        let user = unit.create("users");
        unit.set(user, "name", "Ada").unwrap();
        let released = unit.release(user).expect("The user was tracked");
        assert_eq!(released.field("name"), Some(&"Ada".as_value()));
        assert!(!unit.has_pending());
        silent_logs! {
            let error = unit.set(user, "name", "Grace").err().unwrap();
            assert!(matches!(
                error.downcast_ref::<RookError>(),
                Some(RookError::UnknownModel(..))
            ));
            assert!(unit.get(user, "name").await.is_err());
            assert!(unit.has_many(user, "posts").is_err());
        }
    }

    #[tokio::test]
    async fn conventions() {
        let mut executor = RecordingExecutor::default();
        executor.respond_affected(1, None);
        let mut unit = UnitOfWork::new(&mut executor, &NoCache)
            .with_convention(Convention::new("uid", "{}_uid"));
        let user = unit.find("users", 3);
        assert_eq!(unit.model(user).unwrap().key(), Some(&3.as_value()));
        unit.set(user, "name", "Ada").unwrap();
        unit.flush().await.unwrap();
        let posts = unit.has_many(user, "posts").unwrap().parse();
        drop(unit);
        assert_eq!(
            executor.sql(),
            ["UPDATE `users` SET `name` = ? WHERE `uid` = ?"]
        );
        assert_eq!(
            posts.sql,
            "SELECT `uid` FROM `posts` WHERE `users_uid` = ?"
        );
    }
}
