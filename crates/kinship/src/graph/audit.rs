//! Consistency audit over a set of person records.
//!
//! The graph never produces these violations itself; they show up in data
//! written by other tools or by hand, and in stores left behind by a
//! `PartialCleanupFailure`.

use crate::domain::{Person, PersonId, ScopeId};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A broken invariant found by [`audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A record references itself.
    SelfLoop {
        /// The record
        person: PersonId,
    },

    /// A record references an id that does not exist.
    DanglingReference {
        /// The referencing record
        person: PersonId,
        /// The missing id
        missing: PersonId,
    },

    /// A record references a person in another family tree.
    CrossScope {
        /// The referencing record
        person: PersonId,
        /// The referenced person
        other: PersonId,
        /// The referenced person's family tree
        other_scope: ScopeId,
    },

    /// A parent/child edge is recorded on only one side.
    ParentChildAsymmetry {
        /// The parent
        parent: PersonId,
        /// The child
        child: PersonId,
    },

    /// A partner edge is recorded on only one side.
    PartnerAsymmetry {
        /// The record holding the edge
        person: PersonId,
        /// The partner missing the reverse edge
        partner: PersonId,
    },

    /// Both sides hold a partner edge but disagree on kind or dates.
    PartnerTermsMismatch {
        /// Lower id of the pair
        a: PersonId,
        /// Higher id of the pair
        b: PersonId,
    },

    /// The same id appears more than once in one edge list.
    DuplicateEdge {
        /// The record
        person: PersonId,
        /// The repeated id
        other: PersonId,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::SelfLoop { person } => write!(f, "{person} references itself"),
            Violation::DanglingReference { person, missing } => {
                write!(f, "{person} references missing person {missing}")
            }
            Violation::CrossScope {
                person,
                other,
                other_scope,
            } => write!(f, "{person} references {other} from family tree '{other_scope}'"),
            Violation::ParentChildAsymmetry { parent, child } => {
                write!(f, "parent/child edge {parent} -> {child} is one-sided")
            }
            Violation::PartnerAsymmetry { person, partner } => {
                write!(f, "partner edge {person} -> {partner} is one-sided")
            }
            Violation::PartnerTermsMismatch { a, b } => {
                write!(f, "partner edge {a} <-> {b} has mismatched kind or dates")
            }
            Violation::DuplicateEdge { person, other } => {
                write!(f, "{person} lists {other} more than once")
            }
        }
    }
}

/// Audit `members`, which are expected to share one family tree.
///
/// `resolve` reports the family tree of an id outside `members`, or `None`
/// if it does not exist. Violations are returned in member order.
pub fn audit(members: &[Person], resolve: impl Fn(&PersonId) -> Option<ScopeId>) -> Vec<Violation> {
    let by_id: HashMap<&PersonId, &Person> = members.iter().map(|p| (&p.id, p)).collect();
    let mut violations = Vec::new();

    for person in members {
        check_duplicates(person, &mut violations);

        for other in person.neighbors() {
            if other == person.id {
                violations.push(Violation::SelfLoop {
                    person: person.id.clone(),
                });
                continue;
            }
            if by_id.contains_key(&other) {
                continue;
            }
            match resolve(&other) {
                Some(other_scope) if other_scope != person.scope => {
                    violations.push(Violation::CrossScope {
                        person: person.id.clone(),
                        other,
                        other_scope,
                    });
                }
                Some(_) => {}
                None => violations.push(Violation::DanglingReference {
                    person: person.id.clone(),
                    missing: other,
                }),
            }
        }

        for child_id in &person.children {
            if let Some(child) = by_id.get(child_id)
                && child.id != person.id
                && !child.has_parent(&person.id)
            {
                violations.push(Violation::ParentChildAsymmetry {
                    parent: person.id.clone(),
                    child: child_id.clone(),
                });
            }
        }
        for parent_id in &person.parents {
            if let Some(parent) = by_id.get(parent_id)
                && parent.id != person.id
                && !parent.has_child(&person.id)
            {
                violations.push(Violation::ParentChildAsymmetry {
                    parent: parent_id.clone(),
                    child: person.id.clone(),
                });
            }
        }

        for edge in &person.partners {
            let Some(partner) = by_id.get(&edge.partner) else {
                continue;
            };
            if partner.id == person.id {
                continue;
            }
            match partner.partner_edge(&person.id) {
                None => violations.push(Violation::PartnerAsymmetry {
                    person: person.id.clone(),
                    partner: edge.partner.clone(),
                }),
                // Report each mismatched pair once, from its lower id.
                Some(reverse) if !reverse.same_terms(edge) && person.id < partner.id => {
                    violations.push(Violation::PartnerTermsMismatch {
                        a: person.id.clone(),
                        b: partner.id.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    violations
}

fn check_duplicates(person: &Person, violations: &mut Vec<Violation>) {
    let lists = [
        person.parents.iter().collect::<Vec<_>>(),
        person.children.iter().collect(),
        person.partners.iter().map(|edge| &edge.partner).collect(),
    ];
    for list in lists {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for id in list {
            if !seen.insert(id) && reported.insert(id) {
                violations.push(Violation::DuplicateEdge {
                    person: person.id.clone(),
                    other: id.clone(),
                });
            }
        }
    }
}
