use crate::{
    Error, Result, RookError,
    schema::{MySqlSchemaWriter, PostgresSchemaWriter, SchemaWriter, SqliteSchemaWriter},
};
use std::fmt::{self, Display};

/// SQL family the schema writers know how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn from_driver_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pgsql" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => {
                let error = Error::new(RookError::UnsupportedDialect(name.to_owned()));
                log::error!("{:#}", error);
                Err(error)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "MySQL",
            Dialect::Postgres => "PostgreSQL",
            Dialect::Sqlite => "SQLite",
        }
    }

    pub fn schema_writer(&self) -> &'static dyn SchemaWriter {
        match self {
            Dialect::MySql => &MySqlSchemaWriter,
            Dialect::Postgres => &PostgresSchemaWriter,
            Dialect::Sqlite => &SqliteSchemaWriter,
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
