//! Rooted tree materialization for rendering.
//!
//! A family graph is not a tree: people have two parents, components are
//! disconnected, and damaged data can contain cycles. [`TreeBuilder`] turns a
//! [`FamilySnapshot`] into one finite tree with fixed policies:
//!
//! 1. **Roots**: the caller's list, else every member without in-scope
//!    parents, in store order.
//! 2. **Fallback**: with no parentless member (every member sits on a cycle
//!    or below one), the lexicographically smallest id becomes the root.
//! 3. **Virtual root**: with several roots, a synthetic node (named "Family"
//!    by default) carries them as children. It has no person id.
//! 4. **Traversal**: depth-first pre-order, children in store order, with a
//!    single visited set for the whole build. A person reached a second time,
//!    typically through their second parent, is left out of that branch.
//! 5. **Attributes**: gender, dates and the *first* partner only.
//!
//! Rule 4 drops information on purpose: each person is rendered exactly
//! once. Members not reachable from any root are not rendered.

use crate::domain::{Gender, PersonId, RelationshipKind};
use crate::error::{Error, Result};
use crate::snapshot::FamilySnapshot;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Name given to the synthetic root when a tree has several roots.
pub const DEFAULT_VIRTUAL_ROOT_NAME: &str = "Family";

/// The first partner of a rendered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummary {
    /// Partner id
    pub id: PersonId,
    /// Partner name, when the partner is a member of the same tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Kind of relationship
    pub relationship: RelationshipKind,
    /// Start date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// End date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Display attributes of a rendered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttributes {
    /// Gender
    pub gender: Gender,
    /// Date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
    /// First partner in the person's list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<PartnerSummary>,
}

/// A node of a materialized tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Person id, `None` for the virtual root
    pub id: Option<PersonId>,
    /// Display name
    pub name: String,
    /// Display attributes, `None` for the virtual root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<NodeAttributes>,
    /// Child nodes
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Whether this is the synthetic multi-root node
    pub fn is_virtual(&self) -> bool {
        self.id.is_none()
    }

    /// Person ids in pre-order. The virtual root contributes nothing.
    pub fn pre_order_ids(&self) -> Vec<&PersonId> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(id) = &node.id {
                out.push(id);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Ids of the direct children.
    pub fn child_ids(&self) -> Vec<&PersonId> {
        self.children.iter().filter_map(|c| c.id.as_ref()).collect()
    }
}

impl Drop for TreeNode {
    // Long parent chains nest deeply; unlink them without recursing.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Builds a [`TreeNode`] from a snapshot.
#[derive(Debug, Clone)]
pub struct TreeBuilder<'a> {
    snapshot: &'a FamilySnapshot,
    virtual_root_name: String,
}

impl<'a> TreeBuilder<'a> {
    /// Builder over `snapshot` with the default virtual root name.
    pub fn new(snapshot: &'a FamilySnapshot) -> Self {
        Self {
            snapshot,
            virtual_root_name: DEFAULT_VIRTUAL_ROOT_NAME.to_string(),
        }
    }

    /// Use `name` for the synthetic multi-root node.
    #[must_use]
    pub fn with_virtual_root_name(mut self, name: impl Into<String>) -> Self {
        self.virtual_root_name = name.into();
        self
    }

    /// Materialize the tree.
    ///
    /// `roots` overrides root discovery when non-empty; repeated entries are
    /// ignored after the first.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyScope` if the family tree has no members
    /// - `Error::PersonNotFound` if a supplied root is not a member
    pub fn build(&self, roots: &[PersonId]) -> Result<TreeNode> {
        if self.snapshot.is_empty() {
            return Err(Error::EmptyScope(self.snapshot.scope().clone()));
        }

        let roots = self.resolve_roots(roots)?;
        let (slots, top) = self.walk(&roots);
        let mut nodes = assemble(slots, &top);

        if roots.len() == 1
            && let Some(node) = nodes.pop()
        {
            return Ok(node);
        }

        Ok(TreeNode {
            id: None,
            name: self.virtual_root_name.clone(),
            attributes: None,
            children: nodes,
        })
    }

    fn resolve_roots(&self, requested: &[PersonId]) -> Result<Vec<&'a PersonId>> {
        if !requested.is_empty() {
            let mut roots: Vec<&'a PersonId> = Vec::with_capacity(requested.len());
            for id in requested {
                let member = self
                    .snapshot
                    .get(id)
                    .ok_or_else(|| Error::PersonNotFound(id.clone()))?;
                if !roots.contains(&&member.id) {
                    roots.push(&member.id);
                }
            }
            return Ok(roots);
        }

        let parentless = self.snapshot.parentless();
        if !parentless.is_empty() {
            return Ok(parentless);
        }

        // Non-empty snapshot, so a minimum exists.
        Ok(self
            .snapshot
            .persons()
            .iter()
            .map(|p| &p.id)
            .min()
            .into_iter()
            .collect())
    }

    /// Depth-first pre-order walk over an explicit stack.
    ///
    /// Returns the visited nodes in pre-order, each with the slot indices of
    /// its children, plus the slot indices of the top-level nodes. A child
    /// always has a higher slot index than its parent.
    fn walk(&self, roots: &[&'a PersonId]) -> (Vec<Slot>, Vec<usize>) {
        let mut visited: HashSet<&'a PersonId> = HashSet::new();
        let mut slots: Vec<Slot> = Vec::new();
        let mut top = Vec::new();

        // (person, slot of the parent node). Siblings are pushed in reverse
        // so they pop in store order; the visited check runs at pop time.
        let mut stack: Vec<(&'a PersonId, Option<usize>)> =
            roots.iter().rev().map(|&root| (root, None)).collect();

        while let Some((id, parent)) = stack.pop() {
            if visited.contains(id) {
                continue;
            }
            let Some(node) = self.node(id) else {
                continue;
            };
            visited.insert(id);

            let index = slots.len();
            slots.push(Slot {
                node,
                children: Vec::new(),
            });
            match parent {
                Some(parent) => slots[parent].children.push(index),
                None => top.push(index),
            }

            let children = self.snapshot.children(id);
            stack.extend(children.into_iter().rev().map(|child| (child, Some(index))));
        }

        (slots, top)
    }

    /// A childless node for `id`.
    fn node(&self, id: &PersonId) -> Option<TreeNode> {
        let person = self.snapshot.get(id)?;

        let partner = person.partners.first().map(|edge| PartnerSummary {
            id: edge.partner.clone(),
            name: self.snapshot.get(&edge.partner).map(|p| p.name.clone()),
            relationship: edge.relationship,
            start_date: edge.start_date,
            end_date: edge.end_date,
        });

        Some(TreeNode {
            id: Some(id.clone()),
            name: person.name.clone(),
            attributes: Some(NodeAttributes {
                gender: person.gender,
                date_of_birth: person.date_of_birth,
                date_of_death: person.date_of_death,
                partner,
            }),
            children: Vec::new(),
        })
    }
}

/// A walked node waiting for its children to be attached.
struct Slot {
    node: TreeNode,
    children: Vec<usize>,
}

/// Attach children bottom-up and return the top-level nodes in order.
fn assemble(slots: Vec<Slot>, top: &[usize]) -> Vec<TreeNode> {
    let mut done: Vec<Option<TreeNode>> = Vec::with_capacity(slots.len());
    let mut links: Vec<Vec<usize>> = Vec::with_capacity(slots.len());
    for slot in slots {
        done.push(Some(slot.node));
        links.push(slot.children);
    }

    // Children sit at higher indices, so they are complete before their
    // parent is reached.
    for index in (0..done.len()).rev() {
        let children: Vec<TreeNode> = links[index]
            .iter()
            .filter_map(|&child| done[child].take())
            .collect();
        if let Some(node) = done[index].as_mut() {
            node.children = children;
        }
    }

    top.iter().filter_map(|&index| done[index].take()).collect()
}
