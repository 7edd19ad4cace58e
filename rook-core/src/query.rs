use crate::{
    Column, Condition, Connector, Direction, Executor, GenericSqlWriter, IntoColumns,
    IntoConditions, Join, JoinType, Model, Result, RowLabeled, SqlWriter, Statement, Value,
};

/// Declarative SELECT builder.
///
/// Methods consume and return the builder, [`Query::parse`] compiles it into a [`Statement`]
/// whose placeholders follow the condition order.
///
/// ```rust
/// use rook_core::{Connector, Query, Value};
/// let statement = Query::new("users")
///     .filter([("age", ">", 18, Connector::And), ("active", "=", 1, Connector::And)])
///     .parse();
/// assert_eq!(
///     statement.sql,
///     "SELECT * FROM `users` WHERE `age` > ? AND `active` = ?"
/// );
/// assert_eq!(statement.params, [Value::Int(18), Value::Int(1)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) table: String,
    pub(crate) columns: Vec<Column>,
    pub(crate) distinct: bool,
    pub(crate) joins: Vec<Join>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) group_by: Option<Column>,
    pub(crate) order_by: Vec<(Column, Direction)>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: u64,
}

/// Result of [`Query::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Models(Vec<Model>),
    /// The query selected a single column, these are its values.
    Scalars(Vec<Value>),
}

impl Fetched {
    pub fn len(&self) -> usize {
        match self {
            Fetched::Models(v) => v.len(),
            Fetched::Scalars(v) => v.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn into_models(self) -> Option<Vec<Model>> {
        match self {
            Fetched::Models(v) => Some(v),
            Fetched::Scalars(..) => None,
        }
    }
    pub fn into_scalars(self) -> Option<Vec<Value>> {
        match self {
            Fetched::Scalars(v) => Some(v),
            Fetched::Models(..) => None,
        }
    }
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![Column::wildcard()],
            distinct: false,
            joins: Vec::new(),
            conditions: Vec::new(),
            group_by: None,
            order_by: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    pub fn create(columns: impl IntoColumns, table: impl Into<String>) -> Self {
        Self::new(table).select(columns)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Replaces the output columns. An empty list selects `*`.
    pub fn select(mut self, columns: impl IntoColumns) -> Self {
        self.columns = columns.into_columns();
        if self.columns.is_empty() {
            self.columns.push(Column::wildcard());
        }
        self
    }

    pub fn filter(self, conditions: impl IntoConditions) -> Self {
        self.push_conditions(conditions, Connector::And)
    }

    pub fn or_filter(self, conditions: impl IntoConditions) -> Self {
        self.push_conditions(conditions, Connector::Or)
    }

    /// Appends a raw boolean fragment, binds no parameter.
    pub fn filter_raw(self, expression: impl Into<String>) -> Self {
        self.push_conditions(Condition::raw(expression), Connector::And)
    }

    fn push_conditions(mut self, conditions: impl IntoConditions, connector: Connector) -> Self {
        self.conditions
            .extend(conditions.into_conditions(connector));
        self
    }

    pub fn join(
        self,
        table: impl Into<String>,
        left: impl Into<Column>,
        operator: impl Into<String>,
        right: impl Into<Column>,
    ) -> Self {
        self.join_as(JoinType::default(), table, left, operator, right)
    }

    /// A later join to the same table replaces the earlier one, keeping its position.
    pub fn join_as(
        mut self,
        join_type: JoinType,
        table: impl Into<String>,
        left: impl Into<Column>,
        operator: impl Into<String>,
        right: impl Into<Column>,
    ) -> Self {
        let join = Join {
            join_type,
            table: table.into(),
            left: left.into(),
            operator: operator.into(),
            right: right.into(),
        };
        match self.joins.iter_mut().find(|v| v.table == join.table) {
            Some(existing) => *existing = join,
            None => self.joins.push(join),
        }
        self
    }

    pub fn order_by(mut self, column: impl Into<Column>, direction: Direction) -> Self {
        let column = column.into();
        match self.order_by.iter_mut().find(|(v, ..)| *v == column) {
            Some(existing) => existing.1 = direction,
            None => self.order_by.push((column, direction)),
        }
        self
    }

    pub fn order_by_desc(self, column: impl Into<Column>) -> Self {
        self.order_by(column, Direction::Desc)
    }

    pub fn order_by_all<C: Into<Column>>(
        self,
        mapping: impl IntoIterator<Item = (C, Direction)>,
    ) -> Self {
        mapping
            .into_iter()
            .fold(self, |query, (column, direction)| {
                query.order_by(column, direction)
            })
    }

    pub fn group_by(mut self, expression: impl Into<Column>) -> Self {
        self.group_by = Some(expression.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Resets every clause, the table is kept.
    pub fn clear(self) -> Self {
        Self::new(self.table)
    }

    pub fn parse(&self) -> Statement {
        let mut statement = Statement::default();
        GenericSqlWriter::new().write_select(&mut statement.sql, self, &mut statement.params);
        statement
    }

    fn selects_single_column(&self) -> bool {
        self.columns.len() == 1 && !self.columns[0].is_wildcard()
    }

    /// First value of the first row.
    pub async fn column<E: Executor>(self, executor: &mut E) -> Result<Option<Value>> {
        executor.column(self.limit(1).parse()).await
    }

    pub async fn count<E: Executor>(self, executor: &mut E) -> Result<i64> {
        let value = self
            .select(Column::raw("COUNT(*)"))
            .column(executor)
            .await?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or_default())
    }

    pub async fn one<E: Executor>(self, executor: &mut E) -> Result<Option<Model>> {
        let table = self.table.clone();
        Ok(self
            .one_row(executor)
            .await?
            .map(|row| Model::hydrate(table, row)))
    }

    pub async fn one_row<E: Executor>(self, executor: &mut E) -> Result<Option<RowLabeled>> {
        executor.row(self.limit(1).parse()).await
    }

    /// First two columns of every row.
    pub async fn pairs<E: Executor>(self, executor: &mut E) -> Result<Vec<(Value, Value)>> {
        executor.pairs(self.parse()).await
    }

    /// Every row as a [`Model`], or the bare values when a single column is selected.
    pub async fn fetch<E: Executor>(self, executor: &mut E) -> Result<Fetched> {
        if self.selects_single_column() {
            return Ok(Fetched::Scalars(
                executor.fetch_column(self.parse()).await?,
            ));
        }
        let table = self.table.clone();
        Ok(Fetched::Models(
            self.fetch_rows(executor)
                .await?
                .into_iter()
                .map(|row| Model::hydrate(table.clone(), row))
                .collect(),
        ))
    }

    pub async fn fetch_rows<E: Executor>(self, executor: &mut E) -> Result<Vec<RowLabeled>> {
        executor.fetch_all(self.parse()).await
    }
}
