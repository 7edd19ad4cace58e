use crate::{
    AsValue, Cache, Convention, Criterion, Error, Executor, Model, ModelId, Query, Relation,
    Result, RookError, Value, cache_key,
};
use std::{
    collections::{BTreeMap, HashMap},
    mem,
};

/// Fields written on a model since the last flush, last write wins.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Changeset {
    fields: Vec<(String, Value)>,
}

impl Changeset {
    pub fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|(k, ..)| k == field) {
            Some((.., existing)) => *existing = value,
            None => self.fields.push((field.to_owned(), value)),
        }
    }
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(k, v)| (k == field).then_some(v))
    }
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Tracks models and their pending writes for one session.
///
/// Models live in an arena addressed by [`ModelId`]. Writes go through [`UnitOfWork::set`]
/// and become statements only on [`UnitOfWork::flush`], one per model, in model creation
/// order: an `UPDATE` plus a cache eviction for models with a primary key, an `INSERT`
/// assigning the generated key otherwise.
///
/// Use [`UnitOfWork::scope`] to have the flush happen automatically.
pub struct UnitOfWork<'c, E: Executor, C: Cache + ?Sized> {
    executor: &'c mut E,
    cache: &'c C,
    convention: Convention,
    models: HashMap<ModelId, Model>,
    pending: BTreeMap<ModelId, Changeset>,
    next_id: u64,
}

impl<'c, E: Executor, C: Cache + ?Sized> UnitOfWork<'c, E, C> {
    pub fn new(executor: &'c mut E, cache: &'c C) -> Self {
        Self {
            executor,
            cache,
            convention: Convention::default(),
            models: HashMap::new(),
            pending: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Convention given to the models created from now on.
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }

    /// Runs `f` then flushes, also when `f` failed. The error of `f` wins over the flush one.
    pub async fn scope<T, F>(executor: &'c mut E, cache: &'c C, f: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut UnitOfWork<'c, E, C>) -> Result<T>,
    {
        let mut unit = UnitOfWork::new(executor, cache);
        let result = f(&mut unit).await;
        let flushed = unit.flush().await;
        let value = result?;
        flushed?;
        Ok(value)
    }

    pub fn executor(&mut self) -> &mut E {
        self.executor
    }

    pub fn cache(&self) -> &C {
        self.cache
    }

    pub fn convention(&self) -> &Convention {
        &self.convention
    }

    fn track(&mut self, model: Model) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;
        self.models.insert(id, model);
        id
    }

    fn unknown(id: ModelId) -> Error {
        let error = Error::new(RookError::UnknownModel(id));
        log::error!("{:#}", error);
        error
    }

    fn tracked(&mut self, id: ModelId) -> Result<&mut Model> {
        self.models.get_mut(&id).ok_or_else(|| Self::unknown(id))
    }

    /// New model without primary key.
    pub fn create(&mut self, table: &str) -> ModelId {
        self.track(Model::new(table).with_convention(self.convention.clone()))
    }

    /// Model of an existing row, loaded on the first field read.
    pub fn find(&mut self, table: &str, key: impl AsValue) -> ModelId {
        self.track(Model::identified(table, key).with_convention(self.convention.clone()))
    }

    pub fn adopt(&mut self, model: Model) -> ModelId {
        self.track(model)
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(&id)
    }

    /// Stops tracking the model, its pending writes are discarded.
    pub fn release(&mut self, id: ModelId) -> Option<Model> {
        self.pending.remove(&id);
        self.models.remove(&id)
    }

    pub fn pending(&self, id: ModelId) -> Option<&Changeset> {
        self.pending.get(&id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Records a pending write.
    pub fn persist(&mut self, id: ModelId, field: &str, value: impl AsValue) -> &mut Self {
        self.pending
            .entry(id)
            .or_default()
            .set(field, value.as_value());
        self
    }

    /// Discards every pending write.
    pub fn reset(&mut self) -> &mut Self {
        self.pending.clear();
        self
    }

    /// Writes every pending changeset.
    ///
    /// All of them are attempted even after a failure, each failure is logged and the first
    /// one is returned. The pending set is always emptied, nothing is retried.
    pub async fn flush(&mut self) -> Result<()> {
        let pending = mem::take(&mut self.pending);
        let mut first_error = None;
        for (id, changeset) in pending {
            if let Err(e) = self.flush_one(id, changeset).await {
                log::error!("Could not flush model {}: {:#}", id, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn flush_one(&mut self, id: ModelId, changeset: Changeset) -> Result<()> {
        let Some(model) = self.models.get_mut(&id) else {
            return Err(Self::unknown(id));
        };
        let table = model.table().to_owned();
        let key_column = model.convention().key.clone();
        match model.key().cloned() {
            Some(key) => {
                self.executor
                    .update(&table, changeset.fields(), &key, &key_column)
                    .await?;
                self.cache.delete(&cache_key(&table, &key));
            }
            None => {
                let key = self
                    .executor
                    .insert(&table, changeset.fields(), &key_column)
                    .await?;
                match key {
                    Some(key) => model.assign_key(key),
                    None => log::warn!("Insert into `{}` did not return a generated key", table),
                }
            }
        }
        model.mark_flushed();
        Ok(())
    }

    /// Value of `field`, loading the model first unless `field` is its primary key.
    ///
    /// Pending writes are kept over the loaded values.
    pub async fn get(&mut self, id: ModelId, field: &str) -> Result<Option<Value>> {
        if self.tracked(id)?.needs_load(field) {
            self.load(id, None).await?;
        }
        Ok(self.tracked(id)?.field(field).cloned())
    }

    /// Writes `field`, recording it for the next flush unless the value is unchanged.
    pub fn set(&mut self, id: ModelId, field: &str, value: impl AsValue) -> Result<&mut Self> {
        let value = value.as_value();
        if self.tracked(id)?.write(field, value.clone()) {
            self.persist(id, field, value);
        }
        Ok(self)
    }

    /// Fetches the model row, pending writes stay on top of the fetched values.
    pub async fn load(&mut self, id: ModelId, criterion: Option<Criterion>) -> Result<bool> {
        let Some(model) = self.models.get_mut(&id) else {
            return Err(Self::unknown(id));
        };
        let found = model.load(self.executor, self.cache, criterion).await?;
        self.reapply_pending(id);
        Ok(found)
    }

    fn reapply_pending(&mut self, id: ModelId) {
        let (Some(model), Some(changeset)) = (self.models.get_mut(&id), self.pending.get(&id))
        else {
            return;
        };
        for (name, value) in changeset.fields() {
            model.write(name, value.clone());
        }
        if !changeset.is_empty() {
            model.mark_dirty();
        }
    }

    /// Dependent `table` row of the model, tracked by this unit of work.
    pub async fn has(&mut self, id: ModelId, table: &str) -> Result<Option<ModelId>> {
        let Some(model) = self.models.get(&id) else {
            return Err(Self::unknown(id));
        };
        let related = model.has(self.executor, self.cache, table).await?;
        Ok(related.map(|v| self.track(v)))
    }

    /// Owner `table` row of the model, tracked by this unit of work.
    pub async fn belongs_to(
        &mut self,
        id: ModelId,
        table: &str,
        foreign_key: Option<&str>,
    ) -> Result<Option<ModelId>> {
        let model = self.tracked(id)?;
        let foreign_key = model.foreign_key_to(table, foreign_key);
        let convention = model.convention().clone();
        let reference = self.get(id, &foreign_key).await?;
        let owner = Model::owner(self.executor, self.cache, &convention, table, reference).await?;
        Ok(owner.map(|v| self.track(v)))
    }

    pub fn has_many(&self, id: ModelId, table: &str) -> Result<Query> {
        self.model(id)
            .map(|v| v.has_many(table))
            .ok_or_else(|| Self::unknown(id))
    }

    pub fn through(&self, id: ModelId, relation: &Relation) -> Result<Query> {
        self.model(id)
            .map(|v| v.through(relation))
            .ok_or_else(|| Self::unknown(id))
    }
}

impl<E: Executor, C: Cache + ?Sized> Drop for UnitOfWork<'_, E, C> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            log::warn!(
                "Unit of work dropped with {} pending changesets, they were not written",
                self.pending.len()
            );
        }
    }
}
