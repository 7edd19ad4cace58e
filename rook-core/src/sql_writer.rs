use crate::{
    CANONICAL_QUOTE, Column, Condition, Error, JoinType, Query, Result, Value, separated_by,
    validate_identifier,
};
use std::fmt::Write;

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Writes SELECT and DML text quoted with [`CANONICAL_QUOTE`].
///
/// Every method has a default implementation, dialect writers override the few fragments that
/// differ (boolean literals, mostly).
pub trait SqlWriter {
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push(CANONICAL_QUOTE);
        out.push_str(value);
        out.push(CANONICAL_QUOTE);
    }

    /// Quotes every dotted part, `*` excluded.
    fn write_name(&self, out: &mut String, name: &str) {
        separated_by(
            out,
            name.split('.'),
            |out, part| {
                if part == "*" {
                    out.push('*');
                } else {
                    self.write_identifier_quoted(out, part);
                }
            },
            ".",
        );
    }

    fn write_column(&self, out: &mut String, value: &Column) {
        match value {
            Column::Name(name) => self.write_name(out, name),
            Column::Raw(raw) => out.push_str(raw),
        }
    }

    fn write_bool(&self, out: &mut String, value: bool) {
        out.push_str(if value { "TRUE" } else { "FALSE" });
    }

    /// Literal rendering, used for column defaults.
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Boolean(v) => self.write_bool(out, *v),
            Value::Int(v) => write_integer!(out, *v),
            Value::Float(v) => {
                let mut buffer = ryu::Buffer::new();
                out.push_str(buffer.format(*v));
            }
            Value::Decimal(v) => {
                let _ = write!(out, "{}", v);
            }
            Value::Text(v) => {
                out.push('\'');
                self.write_escaped(out, v, '\'', "''");
                out.push('\'');
            }
            Value::Blob(..) => {
                let _ = write!(out, "X'{}'", value);
            }
            Value::Timestamp(..) | Value::Uuid(..) => {
                let _ = write!(out, "'{}'", value);
            }
        }
    }

    fn write_condition(&self, out: &mut String, condition: &Condition, params: &mut Vec<Value>) {
        self.write_column(out, &condition.column);
        if let Some(operator) = &condition.operator {
            out.push(' ');
            out.push_str(operator);
            out.push_str(" ?");
            params.push(condition.value.clone());
        }
    }

    fn write_select(&self, out: &mut String, query: &Query, params: &mut Vec<Value>) {
        out.push_str("SELECT ");
        if query.distinct {
            out.push_str("DISTINCT ");
        }
        separated_by(out, &query.columns, |out, v| self.write_column(out, v), ", ");
        out.push_str(" FROM ");
        self.write_name(out, &query.table);
        for join in &query.joins {
            out.push(' ');
            out.push_str(join.join_type.as_str());
            out.push_str(" JOIN ");
            self.write_name(out, &join.table);
            if join.join_type == JoinType::Cross {
                continue;
            }
            out.push_str(" ON ");
            self.write_column(out, &join.left);
            out.push(' ');
            out.push_str(&join.operator);
            out.push(' ');
            self.write_column(out, &join.right);
        }
        if !query.conditions.is_empty() {
            out.push_str(" WHERE ");
            for (i, condition) in query.conditions.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                    out.push_str(condition.connector.unwrap_or_default().as_str());
                    out.push(' ');
                }
                self.write_condition(out, condition, params);
            }
        }
        if let Some(group_by) = &query.group_by {
            out.push_str(" GROUP BY ");
            self.write_column(out, group_by);
        }
        if !query.order_by.is_empty() {
            out.push_str(" ORDER BY ");
            separated_by(
                out,
                &query.order_by,
                |out, (column, direction)| {
                    self.write_column(out, column);
                    out.push(' ');
                    out.push_str(direction.as_str());
                },
                ", ",
            );
        }
        if let Some(limit) = query.limit {
            out.push_str(" LIMIT ");
            write_integer!(out, limit);
            out.push_str(" OFFSET ");
            write_integer!(out, query.offset);
        }
    }

    /// `INSERT INTO t (a, b) VALUES (?, ?)`, with `RETURNING` when `returning` is given.
    fn write_insert(
        &self,
        out: &mut String,
        table: &str,
        fields: &[(String, Value)],
        returning: Option<&str>,
        params: &mut Vec<Value>,
    ) -> Result<()> {
        out.push_str("INSERT INTO ");
        self.write_name(out, validate_identifier(table)?);
        if fields.is_empty() {
            out.push_str(" DEFAULT VALUES");
        } else {
            out.push_str(" (");
            for (i, (name, ..)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.write_identifier_quoted(out, validate_identifier(name)?);
            }
            out.push_str(") VALUES (");
            separated_by(out, fields, |out, _| out.push('?'), ", ");
            out.push(')');
            params.extend(fields.iter().map(|(.., v)| v.clone()));
        }
        if let Some(returning) = returning {
            out.push_str(" RETURNING ");
            self.write_identifier_quoted(out, validate_identifier(returning)?);
        }
        Ok(())
    }

    fn write_update(
        &self,
        out: &mut String,
        table: &str,
        fields: &[(String, Value)],
        key: &Value,
        key_column: &str,
        params: &mut Vec<Value>,
    ) -> Result<()> {
        if fields.is_empty() {
            return Err(Error::msg(format!(
                "Cannot update table `{}` without any field to set",
                table
            )));
        }
        out.push_str("UPDATE ");
        self.write_name(out, validate_identifier(table)?);
        out.push_str(" SET ");
        for (i, (name, value)) in fields.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_identifier_quoted(out, validate_identifier(name)?);
            out.push_str(" = ?");
            params.push(value.clone());
        }
        out.push_str(" WHERE ");
        self.write_identifier_quoted(out, validate_identifier(key_column)?);
        out.push_str(" = ?");
        params.push(key.clone());
        Ok(())
    }

    fn write_delete(
        &self,
        out: &mut String,
        table: &str,
        key: &Value,
        key_column: &str,
        params: &mut Vec<Value>,
    ) -> Result<()> {
        out.push_str("DELETE FROM ");
        self.write_name(out, validate_identifier(table)?);
        out.push_str(" WHERE ");
        self.write_identifier_quoted(out, validate_identifier(key_column)?);
        out.push_str(" = ?");
        params.push(key.clone());
        Ok(())
    }
}

/// Dialect neutral writer used by the query builder and the executor write helpers.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;
impl GenericSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}
impl SqlWriter for GenericSqlWriter {}
