use crate::{RowLabeled, Value};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

/// Row level cache consulted by [`crate::Model::load`] and invalidated on flush.
pub trait Cache: Send + Sync {
    fn set(&self, key: &str, row: RowLabeled);
    fn get(&self, key: &str) -> Option<RowLabeled>;
    /// Returns whether an entry was removed.
    fn delete(&self, key: &str) -> bool;
    fn exists(&self, key: &str) -> bool;
}

/// Key of the row whose primary key is `key` in `table`.
///
/// Plain concatenation: `("user", 12)` and `("user1", 2)` share the key `user12`.
pub fn cache_key(table: &str, key: &Value) -> String {
    format!("{}{}", table, key)
}

/// Cache that never stores anything.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoCache;

impl Cache for NoCache {
    fn set(&self, _key: &str, _row: RowLabeled) {}
    fn get(&self, _key: &str) -> Option<RowLabeled> {
        None
    }
    fn delete(&self, _key: &str) -> bool {
        false
    }
    fn exists(&self, _key: &str) -> bool {
        false
    }
}

#[derive(Default, Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, RowLabeled>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn set(&self, key: &str, row: RowLabeled) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), row);
    }
    fn get(&self, key: &str) -> Option<RowLabeled> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
    fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }
    fn exists(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}
