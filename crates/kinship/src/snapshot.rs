//! Read-only snapshot of one family tree.
//!
//! A [`FamilySnapshot`] copies a scope's records out of the store and indexes
//! their edges in a petgraph `DiGraph`, so tree materialization and path
//! finding run without touching the store and without mutating anything.
//!
//! ## Edge Direction Convention
//!
//! - **ParentChild**: edge is `parent -> child`
//! - **Partner**: one edge per unordered pair, from the member listed first
//!   in store order
//!
//! Edges are the union of what either endpoint claims, restricted to
//! members of the scope: a one-sided parent/child entry still yields an
//! edge, and references to ids outside the scope are dropped.
//!
//! All neighbor queries return ids in store order, which pins traversal
//! order for a given store listing.

use crate::domain::{PartnerEdge, Person, PersonId, ScopeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Kind of edge in a snapshot graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Source is the parent, target the child
    ParentChild,
    /// Undirected partner link
    Partner,
}

/// Indexed, immutable view of a family tree.
#[derive(Debug, Clone)]
pub struct FamilySnapshot {
    scope: ScopeId,

    /// Members in store order. Node `i` of `graph` is `persons[i]`.
    persons: Vec<Person>,

    /// Mapping from PersonId to graph NodeIndex.
    node_map: HashMap<PersonId, NodeIndex>,

    graph: DiGraph<PersonId, EdgeKind>,
}

impl FamilySnapshot {
    /// Index `persons`, keeping only members of `scope`.
    pub fn new(scope: ScopeId, persons: Vec<Person>) -> Self {
        let persons: Vec<Person> = persons.into_iter().filter(|p| p.scope == scope).collect();

        let mut graph = DiGraph::with_capacity(persons.len(), persons.len() * 2);
        let mut node_map = HashMap::with_capacity(persons.len());
        for person in &persons {
            let node = graph.add_node(person.id.clone());
            node_map.insert(person.id.clone(), node);
        }

        for person in &persons {
            let node = node_map[&person.id];
            for child in &person.children {
                if let Some(&child_node) = node_map.get(child) {
                    add_unique_edge(&mut graph, node, child_node, EdgeKind::ParentChild);
                }
            }
            for parent in &person.parents {
                if let Some(&parent_node) = node_map.get(parent) {
                    add_unique_edge(&mut graph, parent_node, node, EdgeKind::ParentChild);
                }
            }
            for edge in &person.partners {
                if let Some(&partner_node) = node_map.get(&edge.partner) {
                    let (a, b) = if node <= partner_node {
                        (node, partner_node)
                    } else {
                        (partner_node, node)
                    };
                    add_unique_edge(&mut graph, a, b, EdgeKind::Partner);
                }
            }
        }

        Self {
            scope,
            persons,
            node_map,
            graph,
        }
    }

    /// The family tree this snapshot covers
    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    /// Members in store order
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    /// Whether the family tree has no members
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Whether `id` is a member
    pub fn contains(&self, id: &PersonId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up a member
    pub fn get(&self, id: &PersonId) -> Option<&Person> {
        self.node_map
            .get(id)
            .map(|node| &self.persons[node.index()])
    }

    /// In-scope parents of `id`, in store order.
    pub fn parents(&self, id: &PersonId) -> Vec<&PersonId> {
        self.related(id, Direction::Incoming, EdgeKind::ParentChild)
    }

    /// In-scope children of `id`, in store order.
    pub fn children(&self, id: &PersonId) -> Vec<&PersonId> {
        self.related(id, Direction::Outgoing, EdgeKind::ParentChild)
    }

    /// In-scope partners of `id`, in store order.
    pub fn partners(&self, id: &PersonId) -> Vec<&PersonId> {
        let mut partners = self.related(id, Direction::Outgoing, EdgeKind::Partner);
        partners.extend(self.related(id, Direction::Incoming, EdgeKind::Partner));
        self.sort_by_store_order(&mut partners);
        partners.dedup();
        partners
    }

    /// Parents, children and partners of `id` as one set, in store order.
    pub fn neighbors(&self, id: &PersonId) -> Vec<&PersonId> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<&PersonId> = self
            .graph
            .neighbors_undirected(node)
            .map(|n| &self.graph[n])
            .collect();
        self.sort_by_store_order(&mut out);
        out.dedup();
        out
    }

    /// The partner edge `from` holds towards `to`, falling back to the
    /// reverse edge when only `to` records the relationship.
    pub fn partner_edge(&self, from: &PersonId, to: &PersonId) -> Option<&PartnerEdge> {
        self.get(from)
            .and_then(|p| p.partner_edge(to))
            .or_else(|| self.get(to).and_then(|p| p.partner_edge(from)))
    }

    /// Members that have no in-scope parents, in store order.
    pub fn parentless(&self) -> Vec<&PersonId> {
        self.persons
            .iter()
            .filter(|p| self.parents(&p.id).is_empty())
            .map(|p| &p.id)
            .collect()
    }

    fn related(&self, id: &PersonId, direction: Direction, kind: EdgeKind) -> Vec<&PersonId> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<&PersonId> = self
            .graph
            .edges_directed(node, direction)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| match direction {
                Direction::Outgoing => &self.graph[edge.target()],
                Direction::Incoming => &self.graph[edge.source()],
            })
            .collect();
        self.sort_by_store_order(&mut out);
        out
    }

    fn sort_by_store_order(&self, ids: &mut [&PersonId]) {
        ids.sort_by_key(|id| self.node_map.get(*id).map_or(usize::MAX, |n| n.index()));
    }
}

fn add_unique_edge(
    graph: &mut DiGraph<PersonId, EdgeKind>,
    from: NodeIndex,
    to: NodeIndex,
    kind: EdgeKind,
) {
    if from == to {
        return;
    }
    let exists = graph
        .edges_connecting(from, to)
        .any(|edge| *edge.weight() == kind);
    if !exists {
        graph.add_edge(from, to, kind);
    }
}
