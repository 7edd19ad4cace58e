#[cfg(test)]
mod tests {
    use rook::{
        AsValue, Cache, Condition, Convention, Criterion, MemoryCache, Model, ModelState,
        NoCache, Relation, RookError, RowLabeled, Value, cache_key,
    };
    use rook_tests::{RecordingExecutor, silent_logs};

    fn row(names: &[&str], values: Vec<Value>) -> RowLabeled {
        RowLabeled::new(
            names.iter().map(|v| v.to_string()).collect(),
            values.into(),
        )
    }

    #[tokio::test]
    async fn missing_row_clears_the_model() {
        let mut executor = RecordingExecutor::default();
        executor.respond_empty();
        let cache = MemoryCache::new();
        let mut user = Model::identified("users", 5);
        assert_eq!(user.state(), ModelState::Identified);
        let found = user
            .load(&mut executor, &cache, None)
            .await
            .expect("Failed to load");
        assert!(!found);
        assert_eq!(user.state(), ModelState::New);
        assert_eq!(user.fields().count(), 0);
        assert!(cache.is_empty(), "Misses are not cached");
        assert_eq!(
            executor.sql(),
            ["SELECT * FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0"]
        );
        assert_eq!(executor.statements()[0].params, [5.as_value()]);
    }

    #[tokio::test]
    async fn load_uses_the_cache() {
        let mut executor = RecordingExecutor::default();
        executor.respond_rows(&["id", "name"], [vec![5.as_value(), "Ada".as_value()]]);
        let cache = MemoryCache::new();
        let mut first = Model::identified("users", 5);
        assert!(first.load(&mut executor, &cache, None).await.unwrap());
        assert_eq!(first.state(), ModelState::Loaded);
        assert!(cache.exists(&cache_key("users", &5.as_value())));

        let mut second = Model::identified("users", 5);
        assert_eq!(
            second.get(&mut executor, &cache, "name").await.unwrap(),
            Some("Ada".as_value())
        );
        assert!(
            second.load(&mut executor, &cache, None).await.unwrap(),
            "Loading a loaded model is a no-op"
        );
        assert_eq!(executor.statements().len(), 1);
    }

    #[tokio::test]
    async fn load_by_criterion() {
        let mut executor = RecordingExecutor::default();
        executor
            .respond_rows(&["id"], [vec![8]])
            .respond_rows(&["id", "email"], [vec![8.as_value(), "a@b.c".as_value()]])
            .respond_rows(&["id"], [vec![9]])
            .respond_empty();
        let mut user = Model::new("users");
        assert_eq!(user.state(), ModelState::New);
        let criterion =
            Criterion::Conditions(vec![Condition::new("email", "=", "a@b.c")]);
        assert!(
            user.load(&mut executor, &NoCache, Some(criterion))
                .await
                .unwrap()
        );
        assert_eq!(user.key(), Some(&8.as_value()));
        assert!(
            !user
                .load(&mut executor, &NoCache, Some(Criterion::key(9)))
                .await
                .unwrap()
        );
        assert_eq!(user.state(), ModelState::New);
        assert_eq!(
            executor.sql(),
            [
                "SELECT `id` FROM `users` WHERE `email` = ? LIMIT 1 OFFSET 0",
                "SELECT * FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0",
                "SELECT `id` FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0",
                "SELECT * FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0",
            ]
        );
    }

    #[tokio::test]
    async fn nothing_to_load() {
        let mut executor = RecordingExecutor::default();
        let mut user = Model::new("users");
        assert!(!user.load(&mut executor, &NoCache, None).await.unwrap());
        assert_eq!(user.get(&mut executor, &NoCache, "name").await.unwrap(), None);
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn has_and_belongs_to() {
        let mut executor = RecordingExecutor::default();
        let cache = MemoryCache::new();
        cache.set(
            "users5",
            row(&["id", "name"], vec![5.as_value(), "Ada".as_value()]),
        );
        executor
            .respond_rows(&["id"], [vec![11]])
            .respond_rows(
                &["id", "users_id", "bio"],
                [vec![11.as_value(), 5.as_value(), "hi".as_value()]],
            )
            .respond_rows(&["id"], [vec![5]]);
        let user = Model::identified("users", 5);
        let mut profile = user
            .has(&mut executor, &cache, "profiles")
            .await
            .unwrap()
            .expect("The profile exists");
        assert_eq!(profile.table(), "profiles");
        assert_eq!(profile.field("bio"), Some(&"hi".as_value()));

        let owner = profile
            .belongs_to(&mut executor, &cache, "users", None)
            .await
            .unwrap()
            .expect("The owner exists");
        assert_eq!(owner.field("name"), Some(&"Ada".as_value()));

        executor.respond_rows(&["id"], [vec![5]]);
        let author = profile
            .belongs_to(&mut executor, &cache, "users", Some("users_id"))
            .await
            .unwrap();
        assert_eq!(author.and_then(|v| v.key().cloned()), Some(5.as_value()));

        assert!(
            profile
                .belongs_to(&mut executor, &cache, "teams", None)
                .await
                .unwrap()
                .is_none(),
            "The profile has no teams_id"
        );
        assert_eq!(
            executor.sql(),
            [
                "SELECT `id` FROM `profiles` WHERE `users_id` = ? LIMIT 1 OFFSET 0",
                "SELECT * FROM `profiles` WHERE `id` = ? LIMIT 1 OFFSET 0",
                "SELECT `id` FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0",
                "SELECT `id` FROM `users` WHERE `id` = ? LIMIT 1 OFFSET 0",
            ]
        );
    }

    #[test]
    fn relation_queries() {
        let user = Model::identified("users", 5);
        let posts = user.has_many("posts").parse();
        assert_eq!(posts.sql, "SELECT `id` FROM `posts` WHERE `users_id` = ?");
        assert_eq!(posts.params, [5.as_value()]);

        let relation = Relation::parse("ClubThrough", "memberships").unwrap();
        assert_eq!(relation.left(), "club");
        assert_eq!(relation.join_table(), "memberships");
        let clubs = user.through(&relation).parse();
        assert_eq!(
            clubs.sql,
            "SELECT `club`.`id` FROM `club` LEFT JOIN `memberships` ON `club`.`id` = `memberships`.`club_id` WHERE `users_id` = ?"
        );
        assert_eq!(clubs.params, [5.as_value()]);

        let explicit = Relation::through("club", "memberships").join_key("memberships.group_id");
        assert_eq!(
            user.through(&explicit).parse().sql,
            "SELECT `club`.`id` FROM `club` LEFT JOIN `memberships` ON `club`.`id` = `memberships`.`group_id` WHERE `users_id` = ?"
        );
    }

    #[test]
    fn relation_naming() {
        silent_logs! {
            for alias in ["clubs", "through", "Through", ""] {
                let error = Relation::parse(alias, "memberships").unwrap_err();
                assert_eq!(
                    error.downcast_ref::<RookError>(),
                    Some(&RookError::RelationNaming(alias.to_string()))
                );
            }
        }
    }

    #[test]
    fn conventions() {
        let user = Model::identified("users", 5).with_convention(Convention::new("uid", "fk_{}"));
        assert_eq!(user.key(), Some(&5.as_value()));
        assert_eq!(user.field("id"), None);
        assert_eq!(
            user.has_many("posts").parse().sql,
            "SELECT `uid` FROM `posts` WHERE `fk_users` = ?"
        );
        assert_eq!(Convention::default().foreign_key_for("teams"), "teams_id");
    }

    #[test]
    fn cache_keys_concatenate() {
        assert_eq!(cache_key("users", &5.as_value()), "users5");
        assert_eq!(
            cache_key("user", &12.as_value()),
            cache_key("user1", &2.as_value())
        );
        assert_eq!(cache_key("tags", &"abc".as_value()), "tagsabc");
    }

    #[test]
    fn null_key_is_no_key() {
        let mut model = Model::hydrate(
            "users",
            row(&["id", "name"], vec![Value::Null, "Ada".as_value()]),
        );
        assert_eq!(model.key(), None);
        assert_eq!(model.state(), ModelState::New);
        assert!(model.is_loaded());
        model.clear();
        assert!(!model.is_loaded());
        assert_eq!(model.fields().count(), 0);
    }
}
