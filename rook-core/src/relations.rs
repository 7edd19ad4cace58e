use crate::{Convention, Error, Query, Result, RookError, Value};

/// Many-to-many relation reached through a join table.
///
/// `Relation::through("club", "membership")` selects the `club` keys joined with `membership`
/// on `membership.club_id`, restricted to the rows whose `<owner>_id` matches the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    left: String,
    join_table: String,
    join_key: Option<String>,
}

impl Relation {
    pub fn through(left: impl Into<String>, join_table: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            join_table: join_table.into(),
            join_key: None,
        }
    }

    /// Parses aliases like `clubThrough`: the table is everything before `through`.
    pub fn parse(alias: &str, join_table: impl Into<String>) -> Result<Self> {
        let lowered = alias.to_lowercase();
        match lowered.find("through") {
            Some(position) if position > 0 => {
                Ok(Self::through(&lowered[..position], join_table))
            }
            _ => {
                let error = Error::new(RookError::RelationNaming(alias.to_owned()));
                log::error!("{:#}", error);
                Err(error)
            }
        }
    }

    /// Column of the join table matched against the related key, `<join_table>.<left>_id`
    /// by default.
    pub fn join_key(mut self, join_key: impl Into<String>) -> Self {
        self.join_key = Some(join_key.into());
        self
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn join_table(&self) -> &str {
        &self.join_table
    }

    /// Unexecuted query selecting the related keys for the owner `table` with key `key`.
    pub fn query(&self, convention: &Convention, table: &str, key: Value) -> Query {
        let related_key = format!("{}.{}", self.left, convention.key);
        let join_key = self.join_key.clone().unwrap_or_else(|| {
            format!(
                "{}.{}",
                self.join_table,
                convention.foreign_key_for(&self.left)
            )
        });
        Query::new(&self.left)
            .select(related_key.as_str())
            .join(&self.join_table, related_key.as_str(), "=", join_key)
            .filter((convention.foreign_key_for(table), "=", key))
    }
}
