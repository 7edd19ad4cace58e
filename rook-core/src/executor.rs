use crate::{
    Driver, Error, GenericSqlWriter, QueryResult, Result, RowLabeled, RowsAffected, SqlWriter,
    Statement, Value,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::{future::Future, pin::pin};

pub trait Executor: Send + Sized {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// General method to send any statement and return any result type (either row or count)
    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the statement and returns the rows.
    fn fetch(&mut self, statement: Statement) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(statement).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the statement and return the total number of rows affected.
    fn execute(&mut self, statement: Statement) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(statement)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }

    fn fetch_all(
        &mut self,
        statement: Statement,
    ) -> impl Future<Output = Result<Vec<RowLabeled>>> + Send {
        self.fetch(statement).try_collect()
    }

    /// First row, if any.
    fn row(&mut self, statement: Statement) -> impl Future<Output = Result<Option<RowLabeled>>> + Send {
        async move {
            let mut stream = pin!(self.fetch(statement));
            stream.try_next().await
        }
    }

    /// First value of the first row.
    fn column(&mut self, statement: Statement) -> impl Future<Output = Result<Option<Value>>> + Send {
        async move {
            Ok(self
                .row(statement)
                .await?
                .and_then(|row| row.values.into_vec().into_iter().next()))
        }
    }

    /// First value of every row.
    fn fetch_column(
        &mut self,
        statement: Statement,
    ) -> impl Future<Output = Result<Vec<Value>>> + Send {
        self.fetch(statement)
            .map_ok(|row| {
                row.values
                    .into_vec()
                    .into_iter()
                    .next()
                    .unwrap_or_default()
            })
            .try_collect()
    }

    /// First two values of every row.
    fn pairs(
        &mut self,
        statement: Statement,
    ) -> impl Future<Output = Result<Vec<(Value, Value)>>> + Send {
        self.fetch(statement)
            .and_then(|row| async move {
                let mut values = row.values.into_vec().into_iter();
                match (values.next(), values.next()) {
                    (Some(key), Some(value)) => Ok((key, value)),
                    _ => Err(Error::msg("Pairs need a result with at least two columns")),
                }
            })
            .try_collect()
    }

    /// Insert one row and return the generated key.
    ///
    /// Drivers supporting `RETURNING` read `key_column` back, the others report the last
    /// inserted id.
    fn insert(
        &mut self,
        table: &str,
        fields: &[(String, Value)],
        key_column: &str,
    ) -> impl Future<Output = Result<Option<Value>>> + Send {
        async move {
            let returning = self.driver().supports_returning();
            let mut statement = Statement::default();
            GenericSqlWriter::new().write_insert(
                &mut statement.sql,
                table,
                fields,
                returning.then_some(key_column),
                &mut statement.params,
            )?;
            if returning {
                self.column(statement).await
            } else {
                let affected = self.execute(statement).await?;
                Ok(affected.last_affected_id.map(Value::Int))
            }
        }
    }

    /// Update the row whose `key_column` equals `key`, returns the affected rows.
    fn update(
        &mut self,
        table: &str,
        fields: &[(String, Value)],
        key: &Value,
        key_column: &str,
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let mut statement = Statement::default();
            GenericSqlWriter::new().write_update(
                &mut statement.sql,
                table,
                fields,
                key,
                key_column,
                &mut statement.params,
            )?;
            Ok(self.execute(statement).await?.rows_affected)
        }
    }

    fn delete(
        &mut self,
        table: &str,
        key: &Value,
        key_column: &str,
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let mut statement = Statement::default();
            GenericSqlWriter::new().write_delete(
                &mut statement.sql,
                table,
                key,
                key_column,
                &mut statement.params,
            )?;
            Ok(self.execute(statement).await?.rows_affected)
        }
    }
}
