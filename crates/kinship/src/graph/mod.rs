//! The family relationship graph.
//!
//! [`RelationshipGraph`] wraps a [`PersonStore`] and owns edge consistency.
//! Every parent/child and partner edge is written on both endpoints:
//!
//! - **Parent/child**: `child` appears in `parent.children` exactly when
//!   `parent` appears in `child.parents`
//! - **Partner**: `a` holds a [`PartnerEdge`] to `b` exactly when `b` holds
//!   one to `a` with the same kind and dates
//!
//! Self loops and cross-scope edges are rejected.
//!
//! # Mutation Discipline
//!
//! Each mutation runs in two phases. Phase 1 reads and validates without
//! writing. Phase 2 writes every touched record; if the store rejects a write,
//! the records already written are restored from their pre-mutation copies
//! before the error is returned. The graph is therefore unchanged after any
//! failed call, with one exception: [`RelationshipGraph::remove_person`]
//! cleans each neighbor independently and reports leftovers through
//! [`Error::PartialCleanupFailure`].
//!
//! # Concurrency
//!
//! Operations are synchronous and take `&mut self` for writes. Callers that
//! share a graph must serialize mutations per family tree.

mod audit;

pub use audit::{Violation, audit};

use crate::domain::{
    NewPerson, PartnerDates, PartnerEdge, Person, PersonId, PersonUpdate, RelationshipKind,
    ScopeId,
};
use crate::error::{Error, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use crate::snapshot::FamilySnapshot;
use crate::store::PersonStore;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};

/// Default prefix for generated person ids.
pub const DEFAULT_ID_PREFIX: &str = "person";

/// Bidirectionally consistent family graph over a person store.
#[derive(Debug)]
pub struct RelationshipGraph<S> {
    store: S,
    ids: IdGenerator,
}

impl<S: PersonStore> RelationshipGraph<S> {
    /// Wrap `store`, generating ids with the default prefix.
    pub fn new(store: S) -> Self {
        Self::with_id_prefix(store, DEFAULT_ID_PREFIX)
    }

    /// Wrap `store`, generating ids as `{prefix}-{hash}`.
    pub fn with_id_prefix(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            ids: IdGenerator::new(IdGeneratorConfig {
                prefix: prefix.into(),
            }),
        }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap into the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    // ========== Person lifecycle ==========

    /// Create a person, optionally linked to existing parents.
    ///
    /// Parent validation is all-or-nothing: if any id in `initial_parents`
    /// is missing, belongs to another family tree, or is listed twice,
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if the person's fields are invalid
    /// - `Error::InvalidParent` for the first rejected parent
    /// - `Error::Storage` if the store fails (all writes are rolled back)
    pub fn add_person(
        &mut self,
        new_person: NewPerson,
        initial_parents: &[PersonId],
    ) -> Result<PersonId> {
        // === Phase 1: All validations (no mutations) ===
        new_person.validate().map_err(Error::Validation)?;

        let mut seen = HashSet::new();
        let mut parents = Vec::with_capacity(initial_parents.len());
        for parent_id in initial_parents {
            if !seen.insert(parent_id) {
                return Err(Error::InvalidParent {
                    parent: parent_id.clone(),
                    reason: "listed more than once".to_string(),
                });
            }
            let parent = match self.store.get(parent_id) {
                Ok(parent) => parent,
                Err(Error::PersonNotFound(_)) => {
                    return Err(Error::InvalidParent {
                        parent: parent_id.clone(),
                        reason: "does not exist".to_string(),
                    });
                }
                Err(e) => return Err(e),
            };
            if parent.scope != new_person.scope {
                return Err(Error::InvalidParent {
                    parent: parent_id.clone(),
                    reason: format!("belongs to family tree '{}'", parent.scope),
                });
            }
            parents.push(parent);
        }

        // === Phase 2: Id generation ===
        let id = self.generate_id(&new_person)?;
        if seen.contains(&id) {
            return Err(Error::InvalidParent {
                parent: id,
                reason: "a person cannot be their own parent".to_string(),
            });
        }

        // === Phase 3: Write the record, then mirror each parent edge ===
        let person = Person {
            id: id.clone(),
            name: new_person.name.trim().to_string(),
            gender: new_person.gender,
            date_of_birth: new_person.date_of_birth,
            date_of_death: new_person.date_of_death,
            bio: new_person.bio,
            photo: new_person.photo,
            parents: initial_parents.to_vec(),
            children: Vec::new(),
            partners: Vec::new(),
            scope: new_person.scope,
        };

        let mut updated = vec![person];
        let mut originals = vec![None];
        for parent in parents {
            let mut linked = parent.clone();
            linked.children.push(id.clone());
            updated.push(linked);
            originals.push(Some(parent));
        }
        self.commit(updated, originals)?;

        info!(person = %id, parents = initial_parents.len(), "Added person");
        Ok(id)
    }

    /// Apply scalar updates to a person. Edges are never touched.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if the person doesn't exist
    /// - `Error::Validation` if the updated record is invalid
    pub fn update_person(&mut self, id: &PersonId, updates: PersonUpdate) -> Result<Person> {
        let mut person = self.store.get(id)?;
        updates.apply_to(&mut person);
        person.validate().map_err(Error::Validation)?;
        self.store.put(person.clone())?;
        debug!(person = %id, "Updated person");
        Ok(person)
    }

    /// Remove a person after clearing every reference to them.
    ///
    /// Each parent, child and partner is cleaned independently, and cleanup
    /// continues past a failed neighbor. Neighbors that no longer exist count
    /// as clean. If any neighbor could not be written the record is kept and
    /// the call can be retried once the store recovers; already-cleaned
    /// neighbors are not touched again.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if the person doesn't exist
    /// - `Error::PartialCleanupFailure` listing neighbors that still hold a
    ///   reference
    pub fn remove_person(&mut self, id: &PersonId) -> Result<()> {
        let person = self.store.get(id)?;
        let mut pending = Vec::new();

        for neighbor_id in person.neighbors() {
            if neighbor_id == *id {
                continue;
            }
            let mut neighbor = match self.store.get(&neighbor_id) {
                Ok(neighbor) => neighbor,
                Err(Error::PersonNotFound(_)) => {
                    warn!(person = %id, neighbor = %neighbor_id, "Skipping dangling reference");
                    continue;
                }
                Err(e) => {
                    warn!(person = %id, neighbor = %neighbor_id, error = %e, "Could not read neighbor");
                    pending.push(neighbor_id);
                    continue;
                }
            };
            if !detach(&mut neighbor, id) {
                continue;
            }
            if let Err(e) = self.store.put(neighbor) {
                warn!(person = %id, neighbor = %neighbor_id, error = %e, "Could not clean neighbor");
                pending.push(neighbor_id);
            }
        }

        if !pending.is_empty() {
            return Err(Error::PartialCleanupFailure {
                person: id.clone(),
                pending,
            });
        }

        self.store.delete(id)?;
        info!(person = %id, "Removed person");
        Ok(())
    }

    // ========== Parent/child edges ==========

    /// Link `parent` and `child` on both records.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if either person doesn't exist
    /// - `Error::IdenticalPerson` if `parent == child`
    /// - `Error::ScopeMismatch` if they belong to different family trees
    /// - `Error::DuplicateRelationship` if the edge already exists
    pub fn add_parent_edge(&mut self, parent_id: &PersonId, child_id: &PersonId) -> Result<()> {
        let (parent, child) = self.load_pair(parent_id, child_id)?;

        if parent.has_child(child_id) || child.has_parent(parent_id) {
            return Err(Error::DuplicateRelationship {
                from: parent_id.clone(),
                to: child_id.clone(),
            });
        }

        let mut linked_parent = parent.clone();
        let mut linked_child = child.clone();
        linked_parent.children.push(child_id.clone());
        linked_child.parents.push(parent_id.clone());

        self.commit(
            vec![linked_child, linked_parent],
            vec![Some(child), Some(parent)],
        )?;
        debug!(parent = %parent_id, child = %child_id, "Added parent edge");
        Ok(())
    }

    /// Unlink `parent` and `child` on both records.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if either person doesn't exist
    /// - `Error::RelationshipNotFound` unless both records hold the edge
    pub fn remove_parent_edge(&mut self, parent_id: &PersonId, child_id: &PersonId) -> Result<()> {
        let parent = self.store.get(parent_id)?;
        let child = self.store.get(child_id)?;

        if !(parent.has_child(child_id) && child.has_parent(parent_id)) {
            return Err(Error::RelationshipNotFound {
                from: parent_id.clone(),
                to: child_id.clone(),
            });
        }

        let mut unlinked_parent = parent.clone();
        let mut unlinked_child = child.clone();
        unlinked_parent.children.retain(|id| id != child_id);
        unlinked_child.parents.retain(|id| id != parent_id);

        self.commit(
            vec![unlinked_child, unlinked_parent],
            vec![Some(child), Some(parent)],
        )?;
        debug!(parent = %parent_id, child = %child_id, "Removed parent edge");
        Ok(())
    }

    // ========== Partner edges ==========

    /// Link two partners with identical terms on both records.
    ///
    /// To change the kind or dates of an existing relationship, remove it
    /// first.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if the end date precedes the start date
    /// - `Error::PersonNotFound` if either person doesn't exist
    /// - `Error::IdenticalPerson` if `a == b`
    /// - `Error::ScopeMismatch` if they belong to different family trees
    /// - `Error::DuplicateRelationship` if the pair is already linked
    pub fn add_partner_edge(
        &mut self,
        a_id: &PersonId,
        b_id: &PersonId,
        kind: RelationshipKind,
        dates: PartnerDates,
    ) -> Result<()> {
        dates.validate().map_err(Error::Validation)?;
        let (a, b) = self.load_pair(a_id, b_id)?;

        if a.partner_edge(b_id).is_some() || b.partner_edge(a_id).is_some() {
            return Err(Error::DuplicateRelationship {
                from: a_id.clone(),
                to: b_id.clone(),
            });
        }

        let mut linked_a = a.clone();
        let mut linked_b = b.clone();
        linked_a.partners.push(PartnerEdge::new(b_id.clone(), kind, dates));
        linked_b.partners.push(PartnerEdge::new(a_id.clone(), kind, dates));

        self.commit(vec![linked_a, linked_b], vec![Some(a), Some(b)])?;
        debug!(a = %a_id, b = %b_id, relationship = %kind, "Added partner edge");
        Ok(())
    }

    /// Unlink two partners on both records.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if either person doesn't exist
    /// - `Error::RelationshipNotFound` unless both records hold the edge
    pub fn remove_partner_edge(&mut self, a_id: &PersonId, b_id: &PersonId) -> Result<()> {
        let a = self.store.get(a_id)?;
        let b = self.store.get(b_id)?;

        if a.partner_edge(b_id).is_none() || b.partner_edge(a_id).is_none() {
            return Err(Error::RelationshipNotFound {
                from: a_id.clone(),
                to: b_id.clone(),
            });
        }

        let mut unlinked_a = a.clone();
        let mut unlinked_b = b.clone();
        unlinked_a.partners.retain(|edge| edge.partner != *b_id);
        unlinked_b.partners.retain(|edge| edge.partner != *a_id);

        self.commit(vec![unlinked_a, unlinked_b], vec![Some(a), Some(b)])?;
        debug!(a = %a_id, b = %b_id, "Removed partner edge");
        Ok(())
    }

    // ========== Queries ==========

    /// Fetch a person.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if the person doesn't exist
    pub fn get_person(&self, id: &PersonId) -> Result<Person> {
        self.store.get(id)
    }

    /// Parents of a person, in link order.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if the person doesn't exist
    pub fn get_parents(&self, id: &PersonId) -> Result<Vec<PersonId>> {
        Ok(self.store.get(id)?.parents)
    }

    /// Children of a person, in link order.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if the person doesn't exist
    pub fn get_children(&self, id: &PersonId) -> Result<Vec<PersonId>> {
        Ok(self.store.get(id)?.children)
    }

    /// Partner edges of a person, in link order.
    ///
    /// # Errors
    ///
    /// - `Error::PersonNotFound` if the person doesn't exist
    pub fn get_partners(&self, id: &PersonId) -> Result<Vec<PartnerEdge>> {
        Ok(self.store.get(id)?.partners)
    }

    /// Every member of a family tree, in store order.
    ///
    /// # Errors
    ///
    /// - `Error::Storage` if the store cannot list the scope
    pub fn persons(&self, scope: &ScopeId) -> Result<Vec<Person>> {
        self.store.list_by_scope(scope)
    }

    /// Read-only snapshot of a family tree for traversal.
    ///
    /// # Errors
    ///
    /// - `Error::Storage` if the store cannot list the scope
    pub fn snapshot(&self, scope: &ScopeId) -> Result<FamilySnapshot> {
        Ok(FamilySnapshot::new(
            scope.clone(),
            self.store.list_by_scope(scope)?,
        ))
    }

    /// List every invariant violation in a family tree.
    ///
    /// References that leave the scope are resolved against the store to tell
    /// cross-scope edges apart from dangling ones.
    ///
    /// # Errors
    ///
    /// - `Error::Storage` if the store cannot be read
    pub fn check_consistency(&self, scope: &ScopeId) -> Result<Vec<Violation>> {
        let members = self.store.list_by_scope(scope)?;
        let member_ids: HashSet<&PersonId> = members.iter().map(|p| &p.id).collect();

        let mut outside = HashMap::new();
        for person in &members {
            for neighbor in person.neighbors() {
                if member_ids.contains(&neighbor) || outside.contains_key(&neighbor) {
                    continue;
                }
                let scope = match self.store.get(&neighbor) {
                    Ok(found) => Some(found.scope),
                    Err(Error::PersonNotFound(_)) => None,
                    Err(e) => return Err(e),
                };
                outside.insert(neighbor, scope);
            }
        }

        Ok(audit(&members, |id| outside.get(id).cloned().flatten()))
    }

    // ========== Internals ==========

    fn generate_id(&self, new_person: &NewPerson) -> Result<PersonId> {
        let population = self.store.list_by_scope(&new_person.scope)?.len();
        let id = self.ids.generate(
            new_person.name.trim(),
            &new_person.scope,
            population,
            // An id whose slot cannot be read is never handed out.
            |candidate| {
                self.store
                    .contains(&PersonId::new(candidate))
                    .unwrap_or(true)
            },
        )?;
        Ok(PersonId::new(id))
    }

    /// Load both endpoints of a new edge and run the shared checks.
    fn load_pair(&self, from_id: &PersonId, to_id: &PersonId) -> Result<(Person, Person)> {
        let from = self.store.get(from_id)?;
        let to = self.store.get(to_id)?;

        if from_id == to_id {
            return Err(Error::IdenticalPerson(from_id.clone()));
        }
        if from.scope != to.scope {
            return Err(Error::ScopeMismatch {
                from: from_id.clone(),
                from_scope: from.scope,
                to: to_id.clone(),
                to_scope: to.scope,
            });
        }
        Ok((from, to))
    }

    /// Write `updated` in order. On failure, restore the records already
    /// written (in reverse) from `originals`; `None` marks a record that did
    /// not exist before and is deleted instead.
    fn commit(&mut self, updated: Vec<Person>, originals: Vec<Option<Person>>) -> Result<()> {
        debug_assert_eq!(updated.len(), originals.len());

        let ids: Vec<PersonId> = updated.iter().map(|p| p.id.clone()).collect();
        for (written, person) in updated.into_iter().enumerate() {
            if let Err(e) = self.store.put(person) {
                warn!(person = %ids[written], error = %e, "Write failed, rolling back");
                for (id, original) in ids[..written]
                    .iter()
                    .zip(originals.into_iter())
                    .rev()
                {
                    let restored = match original {
                        Some(original) => self.store.put(original),
                        None => self.store.delete(id),
                    };
                    if let Err(rollback_err) = restored {
                        error!(person = %id, error = %rollback_err, "Rollback failed");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Drop every reference to `id` from `person`. Returns whether anything
/// changed.
fn detach(person: &mut Person, id: &PersonId) -> bool {
    let before = (
        person.parents.len(),
        person.children.len(),
        person.partners.len(),
    );
    person.parents.retain(|p| p != id);
    person.children.retain(|c| c != id);
    person.partners.retain(|edge| edge.partner != *id);
    before
        != (
            person.parents.len(),
            person.children.len(),
            person.partners.len(),
        )
}
