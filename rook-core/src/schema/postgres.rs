use crate::{
    ColumnSpec, ColumnType, Dialect, SqlWriter,
    schema::{SchemaWriter, constraint_name},
};
use std::fmt::Write;

const DEFAULT_INTEGER_LENGTH: u64 = 10_000_000_000;

pub struct PostgresSchemaWriter;

impl PostgresSchemaWriter {
    pub fn integer_type(length: Option<u64>) -> &'static str {
        match length.unwrap_or(DEFAULT_INTEGER_LENGTH) {
            ..=32_767 => "SMALLINT",
            ..=2_147_483_647 => "INTEGER",
            _ => "BIGINT",
        }
    }

    pub fn serial_type(length: Option<u64>) -> &'static str {
        match length.unwrap_or(DEFAULT_INTEGER_LENGTH) {
            ..=32_767 => "SMALLSERIAL",
            ..=2_147_483_647 => "SERIAL",
            _ => "BIGSERIAL",
        }
    }
}

impl SqlWriter for PostgresSchemaWriter {}

impl SchemaWriter for PostgresSchemaWriter {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn write_column_type(&self, out: &mut String, spec: &ColumnSpec) {
        match spec.column_type {
            ColumnType::Primary => {
                out.push_str(Self::serial_type(spec.length));
                out.push_str(" PRIMARY KEY");
            }
            ColumnType::Integer => out.push_str(Self::integer_type(spec.length)),
            ColumnType::String => out.push_str("TEXT"),
            ColumnType::Boolean => out.push_str("BOOLEAN"),
            ColumnType::Decimal => {
                let _ = write!(out, "DECIMAL({},{})", spec.precision, spec.scale);
            }
            ColumnType::DateTime => out.push_str("TIMESTAMP WITHOUT TIME ZONE"),
        }
    }

    fn write_create_index(&self, out: &mut String, table: &str, column: &str) {
        out.push_str("CREATE INDEX ");
        self.write_identifier_quoted(out, &constraint_name(table, column, "index"));
        out.push_str(" ON ");
        self.write_identifier_quoted(out, table);
        out.push_str(" USING btree (");
        self.write_identifier_quoted(out, column);
        out.push_str(");");
    }
}
