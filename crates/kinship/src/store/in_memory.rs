//! In-memory person store.
//!
//! Records live in a `HashMap` keyed by id; a separate insertion-order list
//! gives listings a stable order, so tree roots and traversal order do not
//! depend on hash iteration. Data is lost when the process exits unless the
//! store is written out with [`save_to_jsonl`](super::save_to_jsonl).

use crate::domain::{Person, PersonId, ScopeId};
use crate::error::{Error, Result};
use crate::store::PersonStore;
use std::collections::HashMap;

/// Insertion-ordered in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonStore {
    records: HashMap<PersonId, Person>,

    /// Ids in first-insertion order. Every key of `records` appears once.
    order: Vec<PersonId>,
}

impl InMemoryPersonStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, keeping their order. Later records with a
    /// repeated id replace earlier ones in place.
    pub fn from_records(records: impl IntoIterator<Item = Person>) -> Self {
        let mut store = Self::new();
        for person in records {
            store.insert(person);
        }
        store
    }

    /// Number of records across all scopes
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, person: Person) {
        if !self.records.contains_key(&person.id) {
            self.order.push(person.id.clone());
        }
        self.records.insert(person.id.clone(), person);
    }

    fn ordered(&self) -> impl Iterator<Item = &Person> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

impl PersonStore for InMemoryPersonStore {
    fn get(&self, id: &PersonId) -> Result<Person> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| Error::PersonNotFound(id.clone()))
    }

    fn put(&mut self, person: Person) -> Result<()> {
        self.insert(person);
        Ok(())
    }

    fn delete(&mut self, id: &PersonId) -> Result<()> {
        if self.records.remove(id).is_none() {
            return Err(Error::PersonNotFound(id.clone()));
        }
        self.order.retain(|existing| existing != id);
        Ok(())
    }

    fn list_by_scope(&self, scope: &ScopeId) -> Result<Vec<Person>> {
        Ok(self
            .ordered()
            .filter(|person| person.scope == *scope)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<Person>> {
        Ok(self.ordered().cloned().collect())
    }
}
