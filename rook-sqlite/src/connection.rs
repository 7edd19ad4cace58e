use crate::{
    CBox, SqliteDriver,
    bind::bind_value,
    error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::{
    SQLITE_BUSY, SQLITE_DBCONFIG_DQS_DDL, SQLITE_DBCONFIG_DQS_DML, SQLITE_DONE, SQLITE_OK,
    SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI, SQLITE_ROW, sqlite3,
    sqlite3_bind_parameter_count, sqlite3_changes, sqlite3_close, sqlite3_column_count,
    sqlite3_db_config, sqlite3_errmsg, sqlite3_finalize, sqlite3_last_insert_rowid,
    sqlite3_open_v2, sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt,
};
use rook_core::{
    Connection, Context, Driver, Error, Executor, QueryResult, Result, RowLabeled, RowNames,
    RowsAffected, Statement,
    stream::{self, Stream},
    truncate_long,
};
use std::{
    ffi::{CString, c_char, c_int},
    ptr,
};

/// Connection to a sqlite database.
///
/// Statements run to completion when sent, the returned stream replays their results.
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
    driver: SqliteDriver,
}

impl SqliteConnection {
    fn error(&self, context: impl FnOnce() -> String) -> Error {
        let error = unsafe {
            Error::msg(error_message_from_ptr(&sqlite3_errmsg(*self.connection)).to_string())
        }
        .context(context());
        log::error!("{:#}", error);
        error
    }

    fn execute_now(&mut self, statement: &Statement) -> Result<Vec<QueryResult>> {
        let sql = statement.localize(self.driver.identifier_quote());
        log::debug!("{}", truncate_long!(sql));
        let context = || format!("While running the statement:\n{}", truncate_long!(sql));
        unsafe {
            let mut prepared: CBox<*mut sqlite3_stmt> = CBox::new(ptr::null_mut(), |p| {
                sqlite3_finalize(p);
            });
            let mut tail: *const c_char = ptr::null();
            let rc = sqlite3_prepare_v2(
                *self.connection,
                sql.as_ptr() as *const c_char,
                sql.len() as c_int,
                &mut *prepared,
                &mut tail,
            );
            if rc != SQLITE_OK {
                return Err(self.error(context));
            }
            if !tail.is_null() {
                let consumed = tail.offset_from(sql.as_ptr() as *const c_char) as usize;
                if !sql.get(consumed..).unwrap_or_default().trim().is_empty() {
                    let error = Error::msg("Cannot run more than one statement at a time")
                        .context(context());
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
            if prepared.is_null() {
                // Only whitespace or comments
                return Ok(Vec::new());
            }
            let expected = sqlite3_bind_parameter_count(*prepared) as usize;
            if expected != statement.params.len() {
                let error = Error::msg(format!(
                    "The statement expects {} parameters but {} were given",
                    expected,
                    statement.params.len()
                ))
                .context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            for (i, value) in statement.params.iter().enumerate() {
                bind_value(*prepared, i as c_int + 1, value)?;
            }
            let count = sqlite3_column_count(*prepared);
            let labels = (0..count)
                .map(|i| extract_name(*prepared, i))
                .collect::<Result<RowNames>>()?;
            let mut results = Vec::new();
            loop {
                match sqlite3_step(*prepared) {
                    SQLITE_BUSY => continue,
                    SQLITE_DONE => break,
                    SQLITE_ROW => results.push(QueryResult::Row(RowLabeled::new(
                        labels.clone(),
                        (0..count)
                            .map(|i| extract_value(*prepared, i))
                            .collect::<Result<_>>()?,
                    ))),
                    _ => return Err(self.error(context)),
                }
            }
            if count == 0 {
                let is_insert = sql
                    .trim_start()
                    .get(..6)
                    .is_some_and(|v| v.eq_ignore_ascii_case("INSERT"));
                results.push(QueryResult::Affected(RowsAffected {
                    rows_affected: sqlite3_changes(*self.connection) as u64,
                    last_affected_id: is_insert
                        .then(|| sqlite3_last_insert_rowid(*self.connection)),
                }));
            }
            Ok(results)
        }
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        let results = match self.execute_now(&statement) {
            Ok(results) => results.into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(results)
    }
}

impl Connection for SqliteConnection {
    /// Accepts `sqlite://<path>[?mode=ro|rw|rwc|memory]` and `sqlite://:memory:`.
    async fn connect(url: &str) -> Result<SqliteConnection> {
        let driver = SqliteDriver::new();
        let prefix = format!("{}://", driver.name());
        let Some(location) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let uri = CString::new(format!("file:{}", location)).with_context(context)?;
        let mut connection: CBox<*mut sqlite3>;
        let rc;
        unsafe {
            connection = CBox::new(ptr::null_mut(), |p| {
                sqlite3_close(p);
            });
            rc = sqlite3_open_v2(
                uri.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            );
        }
        let result = Self { connection, driver };
        if rc != SQLITE_OK {
            return Err(result.error(|| format!("Could not open the database `{}`", url)));
        }
        // Identifiers are double quoted, an unknown one must fail instead of becoming a string
        for option in [SQLITE_DBCONFIG_DQS_DML, SQLITE_DBCONFIG_DQS_DDL] {
            let rc = unsafe {
                sqlite3_db_config(
                    *result.connection,
                    option,
                    0 as c_int,
                    ptr::null_mut::<c_int>(),
                )
            };
            if rc != SQLITE_OK {
                return Err(result.error(|| {
                    format!("Could not disable double quoted strings on `{}`", url)
                }));
            }
        }
        Ok(result)
    }
}
