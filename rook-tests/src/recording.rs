use rook_core::{
    AsValue, Connection, Driver, Error, Executor, QueryResult, Result, RowLabeled, RowNames,
    RowsAffected, Statement,
    stream::{self, Stream},
};
use std::collections::VecDeque;

/// Driver of [`RecordingExecutor`], it only describes the dialect to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingDriver {
    pub name: &'static str,
    pub quote: char,
    pub returning: bool,
}

impl RecordingDriver {
    pub const fn mysql() -> Self {
        Self {
            name: "mysql",
            quote: '`',
            returning: false,
        }
    }
    pub const fn postgres() -> Self {
        Self {
            name: "postgres",
            quote: '"',
            returning: true,
        }
    }
    pub const fn sqlite() -> Self {
        Self {
            name: "sqlite",
            quote: '"',
            returning: false,
        }
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::mysql()
    }
}

impl Driver for RecordingDriver {
    type Connection = RecordingExecutor;

    fn name(&self) -> &'static str {
        self.name
    }

    fn identifier_quote(&self) -> char {
        self.quote
    }

    fn supports_returning(&self) -> bool {
        self.returning
    }
}

#[derive(Debug)]
enum Response {
    Results(Vec<QueryResult>),
    Fail(String),
}

/// Executor that records every statement it receives, already quoted for its driver, and
/// answers with scripted responses in order.
///
/// Once the script is exhausted every statement affects no rows and returns nothing.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    driver: RecordingDriver,
    statements: Vec<Statement>,
    responses: VecDeque<Response>,
}

impl RecordingExecutor {
    pub fn new(driver: RecordingDriver) -> Self {
        Self {
            driver,
            statements: Vec::new(),
            responses: VecDeque::new(),
        }
    }

    /// Next statement returns these rows.
    pub fn respond_rows<V: AsValue>(
        &mut self,
        labels: &[&str],
        rows: impl IntoIterator<Item = Vec<V>>,
    ) -> &mut Self {
        let labels: RowNames = labels.iter().map(|v| v.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                QueryResult::Row(RowLabeled::new(
                    labels.clone(),
                    row.into_iter().map(AsValue::as_value).collect(),
                ))
            })
            .collect();
        self.responses.push_back(Response::Results(rows));
        self
    }

    /// Next statement returns no row.
    pub fn respond_empty(&mut self) -> &mut Self {
        self.responses.push_back(Response::Results(Vec::new()));
        self
    }

    pub fn respond_affected(&mut self, rows_affected: u64, last_affected_id: Option<i64>) -> &mut Self {
        self.responses
            .push_back(Response::Results(vec![QueryResult::Affected(RowsAffected {
                rows_affected,
                last_affected_id,
            })]));
        self
    }

    /// Next statement fails with `message`.
    pub fn fail(&mut self, message: impl Into<String>) -> &mut Self {
        self.responses.push_back(Response::Fail(message.into()));
        self
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(|v| v.sql.as_str()).collect()
    }

    /// Returns the statements recorded so far and forgets them.
    pub fn take_statements(&mut self) -> Vec<Statement> {
        std::mem::take(&mut self.statements)
    }
}

impl Executor for RecordingExecutor {
    type Driver = RecordingDriver;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        let sql = statement.localize(self.driver.quote).into_owned();
        log::debug!("Recorded: {}", sql);
        self.statements
            .push(Statement::with_params(sql, statement.params));
        let results: Vec<Result<QueryResult>> = match self.responses.pop_front() {
            Some(Response::Results(v)) => v.into_iter().map(Ok).collect(),
            Some(Response::Fail(message)) => vec![Err(Error::msg(message))],
            None => vec![Ok(QueryResult::Affected(RowsAffected::default()))],
        };
        stream::iter(results)
    }
}

impl Connection for RecordingExecutor {
    /// Accepts `recording://mysql`, `recording://postgres` and `recording://sqlite`.
    async fn connect(url: &str) -> Result<RecordingExecutor> {
        let driver = match url.strip_prefix("recording://") {
            Some("mysql") => RecordingDriver::mysql(),
            Some("postgres") => RecordingDriver::postgres(),
            Some("sqlite") => RecordingDriver::sqlite(),
            _ => {
                let error = Error::msg(format!("Unexpected recording url `{}`", url));
                log::error!("{:#}", error);
                return Err(error);
            }
        };
        Ok(RecordingExecutor::new(driver))
    }
}
