use crate::{
    ColumnSpec, ColumnType, Dialect, Result, SqlWriter,
    schema::{DropBehavior, SchemaWriter, constraint_name},
};
use std::fmt::Write;

const DEFAULT_INTEGER_LENGTH: u64 = 2_147_483_647;
const DEFAULT_STRING_LENGTH: u64 = 65_535;

pub struct MySqlSchemaWriter;

impl MySqlSchemaWriter {
    pub fn integer_type(length: Option<u64>) -> &'static str {
        match length.unwrap_or(DEFAULT_INTEGER_LENGTH) {
            ..=127 => "TINYINT",
            ..=32_767 => "SMALLINT",
            ..=8_388_607 => "MEDIUMINT",
            ..=2_147_483_647 => "INT",
            _ => "BIGINT",
        }
    }

    fn is_text_tier(spec: &ColumnSpec) -> bool {
        spec.column_type == ColumnType::String
            && spec.length.unwrap_or(DEFAULT_STRING_LENGTH) >= DEFAULT_STRING_LENGTH
    }
}

impl SqlWriter for MySqlSchemaWriter {}

impl SchemaWriter for MySqlSchemaWriter {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn write_column_type(&self, out: &mut String, spec: &ColumnSpec) {
        match spec.column_type {
            ColumnType::Primary => {
                out.push_str(Self::integer_type(spec.length));
                out.push_str(" NOT NULL AUTO_INCREMENT");
            }
            ColumnType::Integer => out.push_str(Self::integer_type(spec.length)),
            ColumnType::String => match spec.length.unwrap_or(DEFAULT_STRING_LENGTH) {
                length @ ..65_535 => {
                    let _ = write!(out, "VARCHAR({})", length);
                }
                65_535 => out.push_str("TEXT"),
                ..=16_777_215 => out.push_str("MEDIUMTEXT"),
                _ => out.push_str("LONGTEXT"),
            },
            ColumnType::Boolean => out.push_str("TINYINT(1)"),
            ColumnType::Decimal => {
                let _ = write!(out, "DECIMAL({},{})", spec.precision, spec.scale);
            }
            ColumnType::DateTime => out.push_str("DATETIME"),
        }
    }

    fn accepts_default(&self, spec: &ColumnSpec) -> bool {
        !Self::is_text_tier(spec)
    }

    fn write_table_constraints(&self, out: &mut String, primary: &str) {
        out.push_str(",\nPRIMARY KEY (");
        self.write_identifier_quoted(out, primary);
        out.push(')');
    }

    fn write_table_options(&self, out: &mut String) {
        out.push_str(" ENGINE = InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci");
    }

    fn write_drop_behavior(&self, _out: &mut String, _behavior: DropBehavior) {}

    fn write_drop_foreign_key(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        _behavior: DropBehavior,
    ) -> Result<()> {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" DROP FOREIGN KEY ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "fk"));
        out.push(';');
        Ok(())
    }

    fn write_drop_unique(
        &self,
        out: &mut String,
        table: &str,
        column: &str,
        _behavior: DropBehavior,
    ) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" DROP INDEX ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "unique"));
        out.push(';');
    }

    fn write_create_index(&self, out: &mut String, table: &str, column: &str) {
        out.push_str("CREATE INDEX ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "index"));
        out.push_str(" USING BTREE ON ");
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
        _behavior: DropBehavior,
    ) {
        out.push_str("DROP INDEX ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "index"));
        out.push_str(" ON ");
        self.write_identifier_quoted(out, table);
        out.push(';');
    }
}
