use crate::{AsValue, Value};
use std::fmt::{self, Display};

/// Column expression used by queries.
///
/// `Name` is an identifier and gets quoted on output (`table.column` is quoted per part, `*` is
/// never quoted). `Raw` is emitted verbatim, use it for aggregates and function calls.
///
/// Converting from `&str` guesses: text containing `(` becomes `Raw`, anything else a `Name`.
/// A column whose name really contains a parenthesis must be built with [`Column::name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Name(String),
    Raw(String),
}

impl Column {
    pub fn name(value: impl Into<String>) -> Self {
        Column::Name(value.into())
    }
    pub fn raw(value: impl Into<String>) -> Self {
        Column::Raw(value.into())
    }
    pub fn wildcard() -> Self {
        Column::Name("*".into())
    }
    pub fn is_wildcard(&self) -> bool {
        match self {
            Column::Name(v) => v == "*" || v.ends_with(".*"),
            Column::Raw(..) => false,
        }
    }
    pub fn as_str(&self) -> &str {
        match self {
            Column::Name(v) | Column::Raw(v) => v,
        }
    }
}

impl From<&str> for Column {
    fn from(value: &str) -> Self {
        if value.contains('(') {
            Column::Raw(value.into())
        } else {
            Column::Name(value.into())
        }
    }
}

impl From<String> for Column {
    fn from(value: String) -> Self {
        if value.contains('(') {
            Column::Raw(value)
        } else {
            Column::Name(value)
        }
    }
}

impl From<&String> for Column {
    fn from(value: &String) -> Self {
        value.as_str().into()
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column or a list of them.
pub trait IntoColumns {
    fn into_columns(self) -> Vec<Column>;
}

impl IntoColumns for Column {
    fn into_columns(self) -> Vec<Column> {
        vec![self]
    }
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<Column> {
        vec![self.into()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<Column> {
        vec![self.into()]
    }
}

impl<T: Into<Column>, const N: usize> IntoColumns for [T; N] {
    fn into_columns(self) -> Vec<Column> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Column>> IntoColumns for Vec<T> {
    fn into_columns(self) -> Vec<Column> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Logical connector joining a condition to the previous one.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Sort direction, descending unless stated otherwise.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A `WHERE` predicate.
///
/// Without an operator the column is written as is and no parameter is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: Column,
    pub operator: Option<String>,
    pub value: Value,
    /// Connector to the previous condition, `None` takes the one of the call adding it.
    pub connector: Option<Connector>,
}

impl Condition {
    pub fn new(column: impl Into<Column>, operator: impl Into<String>, value: impl AsValue) -> Self {
        Self {
            column: column.into(),
            operator: Some(operator.into()),
            value: value.as_value(),
            connector: None,
        }
    }
    pub fn raw(expression: impl Into<String>) -> Self {
        Self {
            column: Column::Raw(expression.into()),
            operator: None,
            value: Value::Null,
            connector: None,
        }
    }
    pub fn connector(mut self, connector: Connector) -> Self {
        self.connector = Some(connector);
        self
    }
    pub fn has_parameter(&self) -> bool {
        self.operator.is_some()
    }
}

/// The shapes accepted by [`crate::Query::filter`]: a single condition, a `(column, operator,
/// value)` or `(column, operator, value, connector)` tuple, or a list of those.
pub trait IntoConditions {
    /// `connector` fills in conditions that do not carry their own.
    fn into_conditions(self, connector: Connector) -> Vec<Condition>;
}

impl IntoConditions for Condition {
    fn into_conditions(mut self, connector: Connector) -> Vec<Condition> {
        self.connector.get_or_insert(connector);
        vec![self]
    }
}

impl<C: Into<Column>, V: AsValue> IntoConditions for (C, &str, V) {
    fn into_conditions(self, connector: Connector) -> Vec<Condition> {
        Condition::new(self.0, self.1, self.2).into_conditions(connector)
    }
}

impl<C: Into<Column>, V: AsValue> IntoConditions for (C, &str, V, Connector) {
    fn into_conditions(self, _connector: Connector) -> Vec<Condition> {
        vec![Condition::new(self.0, self.1, self.2).connector(self.3)]
    }
}

impl<T: IntoConditions, const N: usize> IntoConditions for [T; N] {
    fn into_conditions(self, connector: Connector) -> Vec<Condition> {
        self.into_iter()
            .flat_map(|v| v.into_conditions(connector))
            .collect()
    }
}

impl<T: IntoConditions> IntoConditions for Vec<T> {
    fn into_conditions(self, connector: Connector) -> Vec<Condition> {
        self.into_iter()
            .flat_map(|v| v.into_conditions(connector))
            .collect()
    }
}
