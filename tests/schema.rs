#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rook::{
        ColumnSpec, DdlOutcome, Dialect, DropBehavior, RookError, Schema, Value,
        schema::{MySqlSchemaWriter, PostgresSchemaWriter, constraint_name, primary_column},
    };
    use rook_tests::{RecordingDriver, RecordingExecutor, silent_logs};

    fn users() -> Vec<(&'static str, ColumnSpec)> {
        vec![
            ("id", ColumnSpec::primary()),
            ("name", ColumnSpec::string().length(100).not_null()),
            ("bio", ColumnSpec::string().default_value("none")),
            ("age", ColumnSpec::integer().length(127).default_value(0)),
            ("active", ColumnSpec::boolean().default_value(true)),
            ("balance", ColumnSpec::decimal(10, 2)),
            ("created_at", ColumnSpec::datetime()),
        ]
    }

    fn create_table(dialect: Dialect) -> String {
        let mut out = String::new();
        dialect
            .schema_writer()
            .write_create_table(&mut out, "users", &users())
            .expect("Failed to write the table");
        out
    }

    #[test]
    fn mysql_create_table() {
        assert_eq!(
            create_table(Dialect::MySql),
            indoc! {"
                CREATE TABLE `users` (
                `id` INT NOT NULL AUTO_INCREMENT,
                `name` VARCHAR(100) NOT NULL,
                `bio` TEXT,
                `age` TINYINT DEFAULT 0,
                `active` TINYINT(1) DEFAULT TRUE,
                `balance` DECIMAL(10,2),
                `created_at` DATETIME,
                PRIMARY KEY (`id`)
                ) ENGINE = InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci;"
            }
        );
    }

    #[test]
    fn postgres_create_table() {
        assert_eq!(
            create_table(Dialect::Postgres),
            indoc! {"
                CREATE TABLE `users` (
                `id` BIGSERIAL PRIMARY KEY,
                `name` TEXT NOT NULL,
                `bio` TEXT DEFAULT 'none',
                `age` SMALLINT DEFAULT 0,
                `active` BOOLEAN DEFAULT TRUE,
                `balance` DECIMAL(10,2),
                `created_at` TIMESTAMP WITHOUT TIME ZONE
                );"
            }
        );
    }

    #[test]
    fn sqlite_create_table() {
        assert_eq!(
            create_table(Dialect::Sqlite),
            indoc! {"
                CREATE TABLE `users` (
                `id` INTEGER PRIMARY KEY AUTOINCREMENT,
                `name` TEXT NOT NULL,
                `bio` TEXT DEFAULT 'none',
                `age` INTEGER DEFAULT 0,
                `active` INTEGER DEFAULT 1,
                `balance` DECIMAL(10,2),
                `created_at` DATETIME
                );"
            }
        );
    }

    #[test]
    fn integer_tiers_are_monotonic() {
        let tiers = [
            (127, "TINYINT"),
            (128, "SMALLINT"),
            (32_767, "SMALLINT"),
            (32_768, "MEDIUMINT"),
            (8_388_607, "MEDIUMINT"),
            (8_388_608, "INT"),
            (2_147_483_647, "INT"),
            (2_147_483_648, "BIGINT"),
        ];
        for (length, expected) in tiers {
            assert_eq!(MySqlSchemaWriter::integer_type(Some(length)), expected);
        }
        assert_ne!(
            MySqlSchemaWriter::integer_type(Some(127)),
            MySqlSchemaWriter::integer_type(Some(128))
        );
        assert_eq!(PostgresSchemaWriter::integer_type(Some(32_767)), "SMALLINT");
        assert_eq!(PostgresSchemaWriter::integer_type(Some(32_768)), "INTEGER");
        assert_eq!(
            PostgresSchemaWriter::serial_type(Some(2_147_483_648)),
            "BIGSERIAL"
        );

        let mut out = String::new();
        Dialect::MySql.schema_writer().write_column_definition(
            &mut out,
            "id",
            &ColumnSpec::primary().length(200),
        );
        assert_eq!(out, "`id` SMALLINT NOT NULL AUTO_INCREMENT");
    }

    #[test]
    fn mysql_text_tiers() {
        let writer = Dialect::MySql.schema_writer();
        let column = |length| {
            let mut out = String::new();
            writer.write_column_definition(
                &mut out,
                "body",
                &ColumnSpec::string().length(length).default_value(""),
            );
            out
        };
        assert_eq!(column(65_534), "`body` VARCHAR(65534) DEFAULT ''");
        assert_eq!(column(65_535), "`body` TEXT");
        assert_eq!(column(65_536), "`body` MEDIUMTEXT");
        assert_eq!(column(16_777_215), "`body` MEDIUMTEXT");
        assert_eq!(column(16_777_216), "`body` LONGTEXT");
    }

    #[test]
    fn defaults() {
        let writer = Dialect::Postgres.schema_writer();
        let column = |spec: ColumnSpec| {
            let mut out = String::new();
            writer.write_column_definition(&mut out, "c", &spec);
            out
        };
        assert_eq!(column(ColumnSpec::integer()), "`c` BIGINT");
        assert_eq!(
            column(ColumnSpec::integer().default_value(Value::Null)),
            "`c` BIGINT DEFAULT NULL"
        );
        assert_eq!(
            column(ColumnSpec::string().default_value("it's").not_null()),
            "`c` TEXT DEFAULT 'it''s' NOT NULL"
        );
        assert_eq!(
            column(ColumnSpec::boolean().default_value(false)),
            "`c` BOOLEAN DEFAULT FALSE"
        );
    }

    #[test]
    fn constraint_names() {
        assert_eq!(constraint_name("users", "email", "unique"), "users_email_unique");
        assert_eq!(primary_column("users", &users()).unwrap(), "id");
        assert_eq!(
            primary_column("users", &[("name", ColumnSpec::string())]).unwrap(),
            "id"
        );
        assert_eq!(
            primary_column("users", &[("code", ColumnSpec::primary())]).unwrap(),
            "code"
        );
        silent_logs! {
            let error = primary_column(
                "users",
                &[("a", ColumnSpec::primary()), ("b", ColumnSpec::primary())],
            )
            .unwrap_err();
            assert_eq!(
                error.downcast_ref::<RookError>(),
                Some(&RookError::MultiplePrimaryKeys("users".into()))
            );
        }
    }

    #[tokio::test]
    async fn dry_run_mysql() {
        let mut executor = RecordingExecutor::new(RecordingDriver::mysql());
        let mut schema = Schema::new(&mut executor).unwrap();
        assert_eq!(schema.dialect(), Dialect::MySql);
        let mut previews = Vec::new();
        previews.push(
            schema
                .drop_table("users", DropBehavior::Cascade, false)
                .await
                .unwrap(),
        );
        previews.push(schema.rename_table("users", "people", false).await.unwrap());
        previews.push(
            schema
                .add_column("users", "nick", &ColumnSpec::string().length(20), false)
                .await
                .unwrap(),
        );
        previews.push(
            schema
                .drop_column("users", "nick", DropBehavior::Restrict, false)
                .await
                .unwrap(),
        );
        previews.push(
            schema
                .rename_column("users", "nick", "alias", false)
                .await
                .unwrap(),
        );
        previews.push(
            schema
                .add_foreign_key("posts", "user_id", "users", "id", false)
                .await
                .unwrap(),
        );
        previews.push(
            schema
                .drop_foreign_key("posts", "user_id", DropBehavior::Cascade, false)
                .await
                .unwrap(),
        );
        previews.push(schema.add_unique("users", "email", false).await.unwrap());
        previews.push(
            schema
                .drop_unique("users", "email", DropBehavior::Cascade, false)
                .await
                .unwrap(),
        );
        previews.push(schema.create_index("users", "email", false).await.unwrap());
        previews.push(
            schema
                .drop_index("users", "email", DropBehavior::Cascade, false)
                .await
                .unwrap(),
        );
        let sql: Vec<_> = previews
            .iter()
            .map(|v| v.sql().expect("Dry runs return text"))
            .collect();
        assert_eq!(
            sql,
            [
                "DROP TABLE IF EXISTS `users`;",
                "ALTER TABLE `users` RENAME TO `people`;",
                "ALTER TABLE `users` ADD COLUMN `nick` VARCHAR(20);",
                "ALTER TABLE `users` DROP COLUMN `nick`;",
                "ALTER TABLE `users` RENAME COLUMN `nick` TO `alias`;",
                "ALTER TABLE `posts` ADD CONSTRAINT `posts_user_id_fk` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE ON UPDATE CASCADE;",
                "ALTER TABLE `posts` DROP FOREIGN KEY `posts_user_id_fk`;",
                "ALTER TABLE `users` ADD CONSTRAINT `users_email_unique` UNIQUE (`email`);",
                "ALTER TABLE `users` DROP INDEX `users_email_unique`;",
                "CREATE INDEX `users_email_index` USING BTREE ON `users` (`email`);",
                "DROP INDEX `users_email_index` ON `users`;",
            ]
        );
        assert!(executor.statements().is_empty(), "Dry runs execute nothing");
    }

    #[tokio::test]
    async fn dry_run_postgres() {
        let mut executor = RecordingExecutor::new(RecordingDriver::postgres());
        let mut schema = Schema::new(&mut executor).unwrap();
        let sql = [
            schema
                .drop_table("users", DropBehavior::Restrict, false)
                .await
                .unwrap(),
            schema
                .drop_column("users", "nick", DropBehavior::Cascade, false)
                .await
                .unwrap(),
            schema
                .drop_foreign_key("posts", "user_id", DropBehavior::Cascade, false)
                .await
                .unwrap(),
            schema
                .drop_unique("users", "email", DropBehavior::Restrict, false)
                .await
                .unwrap(),
            schema.create_index("users", "email", false).await.unwrap(),
            schema
                .drop_index("users", "email", DropBehavior::Cascade, false)
                .await
                .unwrap(),
        ]
        .map(|v| v.sql().map(str::to_owned).unwrap_or_default());
        assert_eq!(
            sql,
            [
                r#"DROP TABLE IF EXISTS "users" RESTRICT;"#,
                r#"ALTER TABLE "users" DROP COLUMN "nick" CASCADE;"#,
                r#"ALTER TABLE "posts" DROP CONSTRAINT "posts_user_id_fk" CASCADE;"#,
                r#"ALTER TABLE "users" DROP CONSTRAINT "users_email_unique" RESTRICT;"#,
                r#"CREATE INDEX "users_email_index" ON "users" USING btree ("email");"#,
                r#"DROP INDEX IF EXISTS "users_email_index" CASCADE;"#,
            ]
        );
    }

    #[tokio::test]
    async fn sqlite_constraints() {
        let mut executor = RecordingExecutor::new(RecordingDriver::sqlite());
        let mut schema = Schema::new(&mut executor).unwrap();
        assert_eq!(
            schema
                .add_unique("users", "email", false)
                .await
                .unwrap()
                .sql(),
            Some(r#"CREATE UNIQUE INDEX "users_email_unique" ON "users" ("email");"#)
        );
        assert_eq!(
            schema
                .drop_unique("users", "email", DropBehavior::Cascade, false)
                .await
                .unwrap()
                .sql(),
            Some(r#"DROP INDEX IF EXISTS "users_email_unique";"#)
        );
        silent_logs! {
            let error = schema
                .add_foreign_key("posts", "user_id", "users", "id", true)
                .await
                .unwrap_err();
            assert!(matches!(
                error.downcast_ref::<RookError>(),
                Some(RookError::UnsupportedOperation { dialect: "SQLite", .. })
            ));
            assert!(
                schema
                    .drop_foreign_key("posts", "user_id", DropBehavior::Cascade, true)
                    .await
                    .is_err()
            );
        }
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn execute() {
        let mut executor = RecordingExecutor::new(RecordingDriver::postgres());
        executor.respond_affected(0, None);
        let mut schema = Schema::new(&mut executor).unwrap();
        let outcome = schema
            .create_table("users", &users(), true)
            .await
            .expect("Failed to create the table");
        assert_eq!(outcome.sql(), None);
        assert!(matches!(outcome, DdlOutcome::Applied(..)));
        assert!(schema.table_exists("users").await);
        let executor = schema.executor();
        executor.fail("no such table: people");
        let mut schema = Schema::new(executor).unwrap();
        assert!(!schema.table_exists("people").await);
        assert_eq!(
            executor_sql(&mut schema),
            [
                create_table(Dialect::Postgres).replace('`', "\""),
                r#"SELECT * FROM "users" LIMIT 1"#.to_string(),
                r#"SELECT * FROM "people" LIMIT 1"#.to_string(),
            ]
        );
    }

    fn executor_sql(schema: &mut Schema<'_, RecordingExecutor>) -> Vec<String> {
        schema
            .executor()
            .sql()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[tokio::test]
    async fn failures_carry_the_statement() {
        let mut executor = RecordingExecutor::new(RecordingDriver::mysql());
        executor.fail("table exists");
        let mut schema = Schema::new(&mut executor).unwrap();
        let error = schema
            .drop_table("users", DropBehavior::Cascade, true)
            .await
            .unwrap_err();
        let message = format!("{:#}", error);
        assert!(message.contains("DROP TABLE IF EXISTS `users`;"));
        assert!(message.contains("table exists"));
    }

    #[test]
    fn unsupported_dialect() {
        silent_logs! {
            let error = Dialect::from_driver_name("oracle").unwrap_err();
            assert_eq!(
                error.downcast_ref::<RookError>(),
                Some(&RookError::UnsupportedDialect("oracle".into()))
            );
            let mut executor = RecordingExecutor::new(RecordingDriver {
                name: "duckdb",
                quote: '"',
                returning: false,
            });
            assert!(Schema::new(&mut executor).is_err());
        }
        assert_eq!(Dialect::from_driver_name("MariaDB").unwrap(), Dialect::MySql);
        assert_eq!(
            Dialect::from_driver_name("postgresql").unwrap(),
            Dialect::Postgres
        );
        assert_eq!(Dialect::from_driver_name("sqlite3").unwrap(), Dialect::Sqlite);
    }
}
