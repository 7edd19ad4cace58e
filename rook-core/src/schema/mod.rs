mod mysql;
mod postgres;
mod sqlite;

pub use mysql::*;
pub use postgres::*;
pub use sqlite::*;

use crate::{
    ColumnSpec, Context, Dialect, Driver, Error, Executor, Result, RookError, RowsAffected,
    SqlWriter, Statement, separated_by, truncate_long,
};

/// What `DROP ... ` does with dependent objects. Dialects without the clause ignore it.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    #[default]
    Cascade,
    Restrict,
}

impl DropBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropBehavior::Cascade => "CASCADE",
            DropBehavior::Restrict => "RESTRICT",
        }
    }
}

/// Name of the constraint or index Rook creates for `table.column`: `<table>_<column>_<suffix>`.
pub fn constraint_name(table: &str, column: &str, suffix: &str) -> String {
    format!("{}_{}_{}", table, column, suffix)
}

/// Column declared as primary key, `id` when none is.
pub fn primary_column<'a>(table: &str, columns: &[(&'a str, ColumnSpec)]) -> Result<&'a str> {
    let mut primary = columns.iter().filter(|(.., spec)| spec.is_primary());
    match (primary.next(), primary.next()) {
        (Some(..), Some(..)) => {
            let error = Error::new(RookError::MultiplePrimaryKeys(table.to_owned()));
            log::error!("{:#}", error);
            Err(error)
        }
        (Some((name, ..)), None) => Ok(*name),
        _ => Ok("id"),
    }
}

/// DDL text generation. The defaults write standard SQL, dialects override what differs.
///
/// Output is quoted with the canonical quote like every other writer.
pub trait SchemaWriter: SqlWriter + Send + Sync {
    fn dialect(&self) -> Dialect;

    fn write_column_type(&self, out: &mut String, spec: &ColumnSpec);

    /// Whether the column type can carry a `DEFAULT` clause.
    fn accepts_default(&self, _spec: &ColumnSpec) -> bool {
        true
    }

    fn write_column_definition(&self, out: &mut String, name: &str, spec: &ColumnSpec) {
        self.write_identifier_quoted(out, name);
        out.push(' ');
        self.write_column_type(out, spec);
        if spec.is_primary() {
            return;
        }
        if let Some(default) = &spec.default {
            if self.accepts_default(spec) {
                out.push_str(" DEFAULT ");
                self.write_value(out, default);
            }
        }
        if !spec.nullable {
            out.push_str(" NOT NULL");
        }
    }

    /// Table level constraints appended after the columns.
    fn write_table_constraints(&self, _out: &mut String, _primary: &str) {}

    /// Options written after the closing parenthesis of `CREATE TABLE`.
    fn write_table_options(&self, _out: &mut String) {}

    fn write_drop_behavior(&self, out: &mut String, behavior: DropBehavior) {
        out.push(' ');
        out.push_str(behavior.as_str());
    }

    fn write_create_table(
        &self,
        out: &mut String,
        table: &str,
        columns: &[(&str, ColumnSpec)],
    ) -> Result<()> {
        let primary = primary_column(table, columns)?;
        out.push_str("CREATE TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" (\n");
        separated_by(
            out,
            columns,
            |out, (name, spec)| self.write_column_definition(out, name, spec),
            ",\n",
        );
        self.write_table_constraints(out, primary);
        out.push_str("\n)");
        self.write_table_options(out);
        out.push(';');
        Ok(())
    }

    fn write_drop_table(&self, out: &mut String, table: &str, behavior: DropBehavior) {
        out.push_str("DROP TABLE IF EXISTS ");
        self.write_identifier_quoted(out, table);
        self.write_drop_behavior(out, behavior);
        out.push(';');
    }

    fn write_rename_table(&self, out: &mut String, table: &str, name: &str) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" RENAME TO ");
        self.write_identifier_quoted(out, name);
        out.push(';');
    }

    fn write_add_column(&self, out: &mut String, table: &str, column: &str, spec: &ColumnSpec) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" ADD COLUMN ");
        self.write_column_definition(out, column, spec);
        out.push(';');
    }

    fn write_drop_column(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        behavior: DropBehavior,
    ) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" DROP COLUMN ");
        self.write_identifier_quoted(out, column);
        self.write_drop_behavior(out, behavior);
        out.push(';');
    }

    fn write_rename_column(&self, out: &mut String, table: &str, column: &str, name: &str) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" RENAME COLUMN ");
        self.write_identifier_quoted(out, column);
        out.push_str(" TO ");
        self.write_identifier_quoted(out, name);
        out.push(';');
    }

    fn write_add_foreign_key(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        foreign_table: &str,
        foreign_key: &str,
    ) -> Result<()> {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" ADD CONSTRAINT ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "fk"));
        out.push_str(" FOREIGN KEY (");
        self.write_identifier_quoted(out, column);
        out.push_str(") REFERENCES ");
        self.write_identifier_quoted(out, foreign_table);
        out.push_str(" (");
        self.write_identifier_quoted(out, foreign_key);
        out.push_str(") ON DELETE CASCADE ON UPDATE CASCADE;");
        Ok(())
    }

    fn write_drop_foreign_key(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        behavior: DropBehavior,
    ) -> Result<()> {
        self.write_drop_constraint(out, table, &constraint_name(table, column, "fk"), behavior);
        Ok(())
    }

    fn write_drop_constraint(
        &self,
        out: &mut String,
        table: &str,
        name: &str,
        behavior: DropBehavior,
    ) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" DROP CONSTRAINT ");
        self.write_identifier_quoted(out, name);
        self.write_drop_behavior(out, behavior);
        out.push(';');
    }

    fn write_add_unique(&self, out: &mut String, table: &str, column: &str) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" ADD CONSTRAINT ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "unique"));
        out.push_str(" UNIQUE (");
        self.write_identifier_quoted(out, column);
        out.push_str(");");
    }

    fn write_drop_unique(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        behavior: DropBehavior,
    ) {
        self.write_drop_constraint(
            out,
            table,
            &constraint_name(table, column, "unique"),
            behavior,
        );
    }

    fn write_create_index(&self, out: &mut String, table: &str, column: &str) {
        out.push_str("CREATE INDEX ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "index"));
        out.push_str(" ON ");
        self.write_identifier_quoted(out, table);
        out.push_str(" (");
        self.write_identifier_quoted(out, column);
        out.push_str(");");
    }

    fn write_drop_index(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        behavior: DropBehavior,
    ) {
        out.push_str("DROP INDEX IF EXISTS ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "index"));
        self.write_drop_behavior(out, behavior);
        out.push(';');
    }
}

/// Outcome of a [`Schema`] operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlOutcome {
    /// Dry run, the statement that would have been executed.
    Preview(String),
    Applied(RowsAffected),
}

impl DdlOutcome {
    pub fn sql(&self) -> Option<&str> {
        match self {
            DdlOutcome::Preview(v) => Some(v),
            DdlOutcome::Applied(..) => None,
        }
    }
    pub fn rows_affected(&self) -> Option<RowsAffected> {
        match self {
            DdlOutcome::Preview(..) => None,
            DdlOutcome::Applied(v) => Some(*v),
        }
    }
}

/// DDL bound to an executor, the dialect comes from its driver.
///
/// Every operation takes `execute`: `false` returns the statement text (quoted for the
/// driver) without touching the database.
pub struct Schema<'e, E: Executor> {
    executor: &'e mut E,
    writer: &'static dyn SchemaWriter,
}

impl<'e, E: Executor> Schema<'e, E> {
    pub fn new(executor: &'e mut E) -> Result<Self> {
        let writer = executor.driver().dialect()?.schema_writer();
        Ok(Self { executor, writer })
    }

    pub fn writer(&self) -> &'static dyn SchemaWriter {
        self.writer
    }

    pub fn dialect(&self) -> Dialect {
        self.writer.dialect()
    }

    pub fn executor(&mut self) -> &mut E {
        self.executor
    }

    async fn apply(&mut self, sql: String, execute: bool) -> Result<DdlOutcome> {
        let quote = self.executor.driver().identifier_quote();
        let statement = Statement::new(sql);
        if !execute {
            return Ok(DdlOutcome::Preview(statement.localize(quote).into_owned()));
        }
        let context = format!(
            "While executing the statement:\n{}",
            truncate_long!(statement.localize(quote))
        );
        log::info!("{}", statement.localize(quote));
        let affected = self.executor.execute(statement).await.context(context)?;
        Ok(DdlOutcome::Applied(affected))
    }

    /// Probes the table with `SELECT * FROM <table> LIMIT 1`, any failure means it is missing.
    pub async fn table_exists(&mut self, table: &str) -> bool {
        let mut sql = String::from("SELECT * FROM ");
        self.writer.write_identifier_quoted(&mut sql, table);
        sql.push_str(" LIMIT 1");
        match self.executor.fetch_all(Statement::new(sql)).await {
            Ok(..) => true,
            Err(e) => {
                log::debug!("Table `{}` is not available: {:#}", table, e);
                false
            }
        }
    }

    pub async fn create_table(
        &mut self,
        table: &str,
        columns: &[(&str, ColumnSpec)],
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer.write_create_table(&mut sql, table, columns)?;
        self.apply(sql, execute).await
    }

    pub async fn drop_table(
        &mut self,
        table: &str,
        behavior: DropBehavior,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer.write_drop_table(&mut sql, table, behavior);
        self.apply(sql, execute).await
    }

    pub async fn rename_table(
        &mut self,
        table: &str,
        name: &str,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer.write_rename_table(&mut sql, table, name);
        self.apply(sql, execute).await
    }

    pub async fn add_column(
        &mut self,
        table: &str,
        column: &str,
        spec: &ColumnSpec,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer.write_add_column(&mut sql, table, column, spec);
        self.apply(sql, execute).await
    }

    pub async fn drop_column(
        &mut self,
        table: &str,
        column: &str,
        behavior: DropBehavior,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer
            .write_drop_column(&mut sql, table, column, behavior);
        self.apply(sql, execute).await
    }

    pub async fn rename_column(
        &mut self,
        table: &str,
        column: &str,
        name: &str,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer.write_rename_column(&mut sql, table, column, name);
        self.apply(sql, execute).await
    }

    pub async fn add_foreign_key(
        &mut self,
        table: &str,
        column: &str,
        foreign_table: &str,
        foreign_key: &str,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer
            .write_add_foreign_key(&mut sql, table, column, foreign_table, foreign_key)?;
        self.apply(sql, execute).await
    }

    pub async fn drop_foreign_key(
        &mut self,
        table: &str,
        column: &str,
        behavior: DropBehavior,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer
            .write_drop_foreign_key(&mut sql, table, column, behavior)?;
        self.apply(sql, execute).await
    }

    pub async fn add_unique(
        &mut self,
        table: &str,
        column: &str,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer.write_add_unique(&mut sql, table, column);
        self.apply(sql, execute).await
    }

    pub async fn drop_unique(
        &mut self,
        table: &str,
        column: &str,
        behavior: DropBehavior,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer
            .write_drop_unique(&mut sql, table, column, behavior);
        self.apply(sql, execute).await
    }

    pub async fn create_index(
        &mut self,
        table: &str,
        column: &str,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer.write_create_index(&mut sql, table, column);
        self.apply(sql, execute).await
    }

    pub async fn drop_index(
        &mut self,
        table: &str,
        column: &str,
        behavior: DropBehavior,
        execute: bool,
    ) -> Result<DdlOutcome> {
        let mut sql = String::new();
        self.writer
            .write_drop_index(&mut sql, table, column, behavior);
        self.apply(sql, execute).await
    }
}
