//! Person storage layer.
//!
//! [`PersonStore`] is the collaborator the relationship graph writes
//! through. It is pure keyed CRUD: it knows nothing about edges and never
//! mirrors anything. Backends:
//!
//! - **In-memory**: [`InMemoryPersonStore`], insertion-ordered
//! - **JSONL**: [`load_from_jsonl`] / [`save_to_jsonl`] persist an in-memory
//!   store to a JSON Lines file
//!
//! # Test Utilities
//!
//! With the `test-util` feature enabled, [`FaultyStore`] wraps any store and
//! fails chosen writes, which is how rollback and partial-cleanup paths are
//! exercised.
//!
//! # Thread Safety
//!
//! Stores are `Send + Sync` but provide no isolation of their own. Callers
//! serialize mutations per family tree.

use crate::domain::{Person, PersonId, ScopeId};
use crate::error::{Error, Result};

pub mod in_memory;
pub mod jsonl;

pub use in_memory::InMemoryPersonStore;
pub use jsonl::{LoadWarning, load_from_jsonl, save_to_jsonl};

/// Keyed storage of person records.
///
/// # Error Handling
///
/// - `get` and `delete` return `Error::PersonNotFound` for unknown ids
/// - Backend failures surface as `Error::Storage`
pub trait PersonStore: Send + Sync {
    /// Fetch a record by id.
    fn get(&self, id: &PersonId) -> Result<Person>;

    /// Insert or replace a record.
    fn put(&mut self, person: Person) -> Result<()>;

    /// Delete a record.
    fn delete(&mut self, id: &PersonId) -> Result<()>;

    /// All records in `scope`, in a deterministic order.
    fn list_by_scope(&self, scope: &ScopeId) -> Result<Vec<Person>>;

    /// All records across every scope, in a deterministic order.
    fn list_all(&self) -> Result<Vec<Person>>;

    /// Whether a record with this id exists.
    fn contains(&self, id: &PersonId) -> Result<bool> {
        match self.get(id) {
            Ok(_) => Ok(true),
            Err(Error::PersonNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// ========== Test Utilities ==========

/// Store wrapper that fails writes touching selected ids.
///
/// Reads always pass through. A failed `put` or `delete` leaves the inner
/// store untouched.
///
/// # Availability
///
/// This type is available when running tests or with the `test-util`
/// feature enabled.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct FaultyStore<S> {
    inner: S,
    failing_puts: std::collections::HashSet<PersonId>,
    failing_deletes: std::collections::HashSet<PersonId>,
}

#[cfg(any(test, feature = "test-util"))]
impl<S: PersonStore> FaultyStore<S> {
    /// Wrap `inner` with no failures configured.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_puts: std::collections::HashSet::new(),
            failing_deletes: std::collections::HashSet::new(),
        }
    }

    /// Make every `put` of this id fail.
    pub fn fail_puts_for(&mut self, id: &PersonId) {
        self.failing_puts.insert(id.clone());
    }

    /// Make every `delete` of this id fail.
    pub fn fail_deletes_for(&mut self, id: &PersonId) {
        self.failing_deletes.insert(id.clone());
    }

    /// Clear all configured failures.
    pub fn heal(&mut self) {
        self.failing_puts.clear();
        self.failing_deletes.clear();
    }

    /// Borrow the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[cfg(any(test, feature = "test-util"))]
impl<S: PersonStore> PersonStore for FaultyStore<S> {
    fn get(&self, id: &PersonId) -> Result<Person> {
        self.inner.get(id)
    }

    fn put(&mut self, person: Person) -> Result<()> {
        if self.failing_puts.contains(&person.id) {
            return Err(Error::Storage(format!("injected put failure for {}", person.id)));
        }
        self.inner.put(person)
    }

    fn delete(&mut self, id: &PersonId) -> Result<()> {
        if self.failing_deletes.contains(id) {
            return Err(Error::Storage(format!("injected delete failure for {id}")));
        }
        self.inner.delete(id)
    }

    fn list_by_scope(&self, scope: &ScopeId) -> Result<Vec<Person>> {
        self.inner.list_by_scope(scope)
    }

    fn list_all(&self) -> Result<Vec<Person>> {
        self.inner.list_all()
    }
}
