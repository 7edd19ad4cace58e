use crate::{
    ColumnSpec, ColumnType, Dialect, Error, Result, RookError, SqlWriter,
    schema::{DropBehavior, SchemaWriter, constraint_name},
};
use std::fmt::Write;

pub struct SqliteSchemaWriter;

impl SqliteSchemaWriter {
    fn unsupported(operation: &'static str) -> Error {
        let error = Error::new(RookError::UnsupportedOperation {
            dialect: Dialect::Sqlite.name(),
            operation,
        });
        log::error!("{:#}", error);
        error
    }
}

impl SqlWriter for SqliteSchemaWriter {
    fn write_bool(&self, out: &mut String, value: bool) {
        out.push(if value { '1' } else { '0' });
    }
}

impl SchemaWriter for SqliteSchemaWriter {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn write_column_type(&self, out: &mut String, spec: &ColumnSpec) {
        match spec.column_type {
            ColumnType::Primary => out.push_str("INTEGER PRIMARY KEY AUTOINCREMENT"),
            ColumnType::Integer | ColumnType::Boolean => out.push_str("INTEGER"),
            ColumnType::String => out.push_str("TEXT"),
            ColumnType::Decimal => {
                let _ = write!(out, "DECIMAL({},{})", spec.precision, spec.scale);
            }
            ColumnType::DateTime => out.push_str("DATETIME"),
        }
    }

    fn write_drop_behavior(&self, _out: &mut String, _behavior: DropBehavior) {}

    fn write_add_foreign_key(
        &self,
        _out: &mut String,
        _table: &str,
        _column: &str,
        _foreign_table: &str,
        _foreign_key: &str,
    ) -> Result<()> {
        Err(Self::unsupported("Adding a foreign key to an existing table"))
    }

    fn write_drop_foreign_key(
        &self,
        _out: &mut String,
        _table: &str,
        _column: &str,
        _behavior: DropBehavior,
    ) -> Result<()> {
        Err(Self::unsupported("Dropping a foreign key"))
    }

    fn write_add_unique(&self, out: &mut String, table: &str, column: &str) {
        out.push_str("CREATE UNIQUE INDEX ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "unique"));
        out.push_str(" ON ");
        self.write_identifier_quoted(out, table);
        out.push_str(" (");
        self.write_identifier_quoted(out, column);
        out.push_str(");");
    }

    fn write_drop_unique(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        _behavior: DropBehavior,
    ) {
        out.push_str("DROP INDEX IF EXISTS ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "unique"));
        out.push(';');
    }
}
