//! Shortest relationship paths.
//!
//! Parent, child and partner edges are treated as one undirected,
//! unweighted graph. [`PathFinder::shortest_path`] runs a breadth-first
//! search from the start person and returns the first path that reaches the
//! end person, so the hop count is minimal.
//!
//! When several shortest paths exist, the one returned follows the
//! snapshot's neighbor order (store order). Callers should rely on the
//! length and endpoints, not on which intermediate people are chosen.

use crate::domain::{PersonId, RelationshipKind};
use crate::snapshot::FamilySnapshot;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// How the next person on a path relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "relationship", rename_all = "lowercase")]
pub enum Relation {
    /// The next person is a parent of the previous one
    Parent,
    /// The next person is a child of the previous one
    Child,
    /// The next person is a partner of the previous one
    Partner(RelationshipKind),
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Parent => write!(f, "parent"),
            Relation::Child => write!(f, "child"),
            Relation::Partner(kind) => write!(f, "partner ({kind})"),
        }
    }
}

/// One hop of a described path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    /// Person the hop starts from
    pub from: PersonId,
    /// Person the hop lands on
    pub to: PersonId,
    /// What `to` is to `from`
    pub relation: Relation,
}

/// Path queries over a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    snapshot: &'a FamilySnapshot,
}

impl<'a> PathFinder<'a> {
    /// Path finder over `snapshot`.
    pub fn new(snapshot: &'a FamilySnapshot) -> Self {
        Self { snapshot }
    }

    /// Shortest path from `start` to `end`, both included.
    ///
    /// Returns an empty path if either person is not a member of the
    /// snapshot or no path connects them. `start == end` yields `[start]`.
    pub fn shortest_path(&self, start: &PersonId, end: &PersonId) -> Vec<PersonId> {
        if !self.snapshot.contains(start) || !self.snapshot.contains(end) {
            return Vec::new();
        }

        // Maps each discovered person to the person it was reached from.
        let mut came_from: HashMap<&PersonId, Option<&PersonId>> = HashMap::new();
        let mut queue: VecDeque<&PersonId> = VecDeque::new();
        came_from.insert(start, None);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == end {
                return reconstruct(&came_from, current);
            }
            for next in self.snapshot.neighbors(current) {
                if !came_from.contains_key(next) {
                    came_from.insert(next, Some(current));
                    queue.push_back(next);
                }
            }
        }

        Vec::new()
    }

    /// Label each hop of `path`.
    ///
    /// Returns `None` if two consecutive people are not directly related.
    /// Parent and child edges take precedence over a partner edge between the
    /// same pair.
    pub fn describe(&self, path: &[PersonId]) -> Option<Vec<PathStep>> {
        path.windows(2)
            .map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                let relation = self.relation(from, to)?;
                Some(PathStep {
                    from: from.clone(),
                    to: to.clone(),
                    relation,
                })
            })
            .collect()
    }

    fn relation(&self, from: &PersonId, to: &PersonId) -> Option<Relation> {
        if self.snapshot.parents(from).contains(&to) {
            return Some(Relation::Parent);
        }
        if self.snapshot.children(from).contains(&to) {
            return Some(Relation::Child);
        }
        if self.snapshot.partners(from).contains(&to) {
            let kind = self
                .snapshot
                .partner_edge(from, to)
                .map_or(RelationshipKind::Other, |edge| edge.relationship);
            return Some(Relation::Partner(kind));
        }
        None
    }
}

fn reconstruct(came_from: &HashMap<&PersonId, Option<&PersonId>>, end: &PersonId) -> Vec<PersonId> {
    let mut path = vec![end.clone()];
    let mut current = end;
    while let Some(Some(previous)) = came_from.get(current) {
        path.push((*previous).clone());
        current = *previous;
    }
    path.reverse();
    path
}
