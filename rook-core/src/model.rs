use crate::{
    AsValue, Cache, Column, Condition, Executor, Query, Relation, Result, RowLabeled, Value,
    cache_key,
};
use std::fmt::{self, Display};

/// Handle of a model tracked by a [`crate::UnitOfWork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelId(pub(crate) u64);

impl Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Naming of the primary key and of foreign keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convention {
    /// Primary key field, `id` by default.
    pub key: String,
    /// Foreign key template, `{}` is replaced by the referenced table. `{}_id` by default.
    pub foreign_key: String,
}

impl Default for Convention {
    fn default() -> Self {
        Self {
            key: "id".into(),
            foreign_key: "{}_id".into(),
        }
    }
}

impl Convention {
    pub fn new(key: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            foreign_key: foreign_key.into(),
        }
    }

    pub fn foreign_key_for(&self, table: &str) -> String {
        self.foreign_key.replacen("{}", table, 1)
    }
}

/// How [`Model::load`] finds the row.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Equality on the primary key column.
    Key(Value),
    Conditions(Vec<Condition>),
}

impl Criterion {
    pub fn key(value: impl AsValue) -> Self {
        Criterion::Key(value.as_value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// No primary key yet.
    New,
    /// Primary key known, row not fetched.
    Identified,
    Loaded,
    /// Written since it was loaded or flushed.
    Dirty,
    /// Flushed successfully and not written since.
    Saved,
}

/// Lazily loaded row of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    table: String,
    fields: Vec<(String, Value)>,
    convention: Convention,
    loaded: bool,
    dirty: bool,
    flushed: bool,
}

impl Model {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            convention: Convention::default(),
            loaded: false,
            dirty: false,
            flushed: false,
        }
    }

    /// Model of the row whose primary key is `key`, nothing is fetched yet.
    pub fn identified(table: impl Into<String>, key: impl AsValue) -> Self {
        let mut model = Self::new(table);
        let key_column = model.convention.key.clone();
        model.put(key_column, key.as_value());
        model
    }

    /// Model populated from a fetched row.
    pub fn hydrate(table: impl Into<String>, row: RowLabeled) -> Self {
        let mut model = Self::new(table);
        model.hydrate_row(row);
        model
    }

    pub fn with_convention(mut self, convention: Convention) -> Self {
        let key = self.key().cloned();
        if let Some(key) = key {
            self.remove(&self.convention.key.clone());
            self.convention = convention;
            let key_column = self.convention.key.clone();
            self.put(key_column, key);
        } else {
            self.convention = convention;
        }
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn convention(&self) -> &Convention {
        &self.convention
    }

    /// Primary key, if known and not null.
    pub fn key(&self) -> Option<&Value> {
        self.field(&self.convention.key).filter(|v| !v.is_null())
    }

    /// Stored value of `name`, never loads.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// False when written since the last load or flush.
    pub fn is_saved(&self) -> bool {
        !self.dirty
    }

    pub fn state(&self) -> ModelState {
        if self.key().is_none() {
            ModelState::New
        } else if self.dirty {
            ModelState::Dirty
        } else if self.flushed {
            ModelState::Saved
        } else if self.loaded {
            ModelState::Loaded
        } else {
            ModelState::Identified
        }
    }

    /// Drops every field, primary key included.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.loaded = false;
        self.dirty = false;
        self.flushed = false;
    }

    pub(crate) fn hydrate_row(&mut self, row: RowLabeled) {
        self.fields = row
            .labels
            .iter()
            .cloned()
            .zip(row.values.into_vec())
            .collect();
        self.loaded = true;
        self.dirty = false;
    }

    fn put(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(k, ..)| *k == name) {
            Some((.., existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    fn remove(&mut self, name: &str) {
        self.fields.retain(|(k, ..)| k != name);
    }

    /// Stores the value, returns false when it equals the stored one.
    pub(crate) fn write(&mut self, name: &str, value: Value) -> bool {
        if self.field(name) == Some(&value) {
            return false;
        }
        self.put(name.to_owned(), value);
        self.dirty = true;
        self.flushed = false;
        true
    }

    pub(crate) fn assign_key(&mut self, key: Value) {
        let key_column = self.convention.key.clone();
        self.put(key_column, key);
    }

    pub(crate) fn mark_flushed(&mut self) {
        self.dirty = false;
        self.flushed = true;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
        self.flushed = false;
    }

    pub(crate) fn needs_load(&self, name: &str) -> bool {
        name != self.convention.key && self.key().is_some() && !self.loaded
    }

    /// Fetches the row, from the cache when possible.
    ///
    /// A criterion first resolves the primary key with a single column query. Without one the
    /// stored key is used and an already loaded model returns `true` right away. When no row
    /// matches the model is cleared and `false` is returned.
    pub async fn load<E: Executor, C: Cache + ?Sized>(
        &mut self,
        executor: &mut E,
        cache: &C,
        criterion: Option<Criterion>,
    ) -> Result<bool> {
        let key_column = self.convention.key.clone();
        let key = match criterion {
            Some(criterion) => {
                let conditions = match criterion {
                    Criterion::Key(v) => vec![Condition::new(Column::name(&key_column), "=", v)],
                    Criterion::Conditions(v) => v,
                };
                let key = Query::create(Column::name(&key_column), &self.table)
                    .filter(conditions)
                    .column(executor)
                    .await?;
                match key {
                    Some(key) if !key.is_null() => key,
                    _ => {
                        self.clear();
                        return Ok(false);
                    }
                }
            }
            None => {
                if self.loaded {
                    return Ok(true);
                }
                match self.key() {
                    Some(key) => key.clone(),
                    None => return Ok(false),
                }
            }
        };
        let cache_key = cache_key(&self.table, &key);
        let row = match cache.get(&cache_key) {
            Some(row) => Some(row),
            None => {
                let row = Query::new(&self.table)
                    .filter((Column::name(&key_column), "=", key))
                    .one_row(executor)
                    .await?;
                if let Some(row) = &row {
                    cache.set(&cache_key, row.clone());
                }
                row
            }
        };
        match row {
            Some(row) => {
                self.hydrate_row(row);
                Ok(true)
            }
            None => {
                self.clear();
                Ok(false)
            }
        }
    }

    /// Value of `name`, loading the row first unless `name` is the primary key.
    pub async fn get<E: Executor, C: Cache + ?Sized>(
        &mut self,
        executor: &mut E,
        cache: &C,
        name: &str,
    ) -> Result<Option<Value>> {
        if self.needs_load(name) {
            self.load(executor, cache, None).await?;
        }
        Ok(self.field(name).cloned())
    }

    /// Dependent row of `table` referencing this one through `<this table>_id`.
    pub async fn has<E: Executor, C: Cache + ?Sized>(
        &self,
        executor: &mut E,
        cache: &C,
        table: &str,
    ) -> Result<Option<Model>> {
        let Some(key) = self.key().cloned() else {
            return Ok(None);
        };
        let foreign_key = self.convention.foreign_key_for(&self.table);
        let mut related = Model::new(table).with_convention(self.convention.clone());
        let criterion = Criterion::Conditions(vec![Condition::new(foreign_key, "=", key)]);
        let found = related.load(executor, cache, Some(criterion)).await?;
        Ok(found.then_some(related))
    }

    /// Owner row of `table` this one references through `foreign_key` (`<table>_id` when
    /// not given).
    pub async fn belongs_to<E: Executor, C: Cache + ?Sized>(
        &mut self,
        executor: &mut E,
        cache: &C,
        table: &str,
        foreign_key: Option<&str>,
    ) -> Result<Option<Model>> {
        let foreign_key = self.foreign_key_to(table, foreign_key);
        let reference = self.get(executor, cache, &foreign_key).await?;
        Self::owner(executor, cache, &self.convention, table, reference).await
    }

    pub(crate) fn foreign_key_to(&self, table: &str, foreign_key: Option<&str>) -> String {
        foreign_key
            .map(str::to_owned)
            .unwrap_or_else(|| self.convention.foreign_key_for(table))
    }

    /// Row of `table` whose primary key is `reference`, `None` for a null reference.
    pub(crate) async fn owner<E: Executor, C: Cache + ?Sized>(
        executor: &mut E,
        cache: &C,
        convention: &Convention,
        table: &str,
        reference: Option<Value>,
    ) -> Result<Option<Model>> {
        let reference = match reference {
            Some(v) if !v.is_null() => v,
            _ => return Ok(None),
        };
        let mut owner = Model::new(table).with_convention(convention.clone());
        let found = owner
            .load(executor, cache, Some(Criterion::Key(reference)))
            .await?;
        Ok(found.then_some(owner))
    }

    /// Unexecuted query selecting the keys of the `table` rows referencing this one.
    pub fn has_many(&self, table: &str) -> Query {
        Query::create(Column::name(&self.convention.key), table).filter((
            self.convention.foreign_key_for(&self.table),
            "=",
            self.key().cloned().unwrap_or_default(),
        ))
    }

    /// Unexecuted query selecting the keys related through a join table.
    pub fn through(&self, relation: &Relation) -> Query {
        relation.query(
            &self.convention,
            &self.table,
            self.key().cloned().unwrap_or_default(),
        )
    }
}
