//! Property tests: no sequence of graph operations, successful or rejected,
//! can leave a family tree with one-sided or dangling edges; and trees and
//! paths stay well formed over any snapshot, however damaged.

use kinship::domain::{
    NewPerson, PartnerDates, PartnerEdge, Person, PersonId, RelationshipKind, ScopeId,
};
use kinship::graph::RelationshipGraph;
use kinship::path::PathFinder;
use kinship::snapshot::FamilySnapshot;
use kinship::store::{InMemoryPersonStore, PersonStore};
use kinship::tree::TreeBuilder;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add { parents: Vec<usize> },
    AddParent(usize, usize),
    RemoveParent(usize, usize),
    AddPartner(usize, usize, RelationshipKind),
    RemovePartner(usize, usize),
    Remove(usize),
}

fn kind_strategy() -> impl Strategy<Value = RelationshipKind> {
    prop_oneof![
        Just(RelationshipKind::Married),
        Just(RelationshipKind::Divorced),
        Just(RelationshipKind::Engaged),
        Just(RelationshipKind::Partners),
        Just(RelationshipKind::Other),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop::collection::vec(any::<usize>(), 0..3).prop_map(|parents| Op::Add { parents }),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::AddParent(a, b)),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::RemoveParent(a, b)),
        2 => (any::<usize>(), any::<usize>(), kind_strategy())
            .prop_map(|(a, b, k)| Op::AddPartner(a, b, k)),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::RemovePartner(a, b)),
        1 => any::<usize>().prop_map(Op::Remove),
    ]
}

/// Pick an id by index; an empty pool yields an id that does not exist.
fn pick(ids: &[PersonId], index: usize) -> PersonId {
    if ids.is_empty() {
        PersonId::new("fam-missing")
    } else {
        ids[index % ids.len()].clone()
    }
}

fn apply(
    graph: &mut RelationshipGraph<InMemoryPersonStore>,
    scope: &ScopeId,
    counter: &mut usize,
    op: &Op,
) -> bool {
    let ids: Vec<PersonId> = graph
        .store()
        .list_all()
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();

    let result = match op {
        Op::Add { parents } => {
            *counter += 1;
            let parents: Vec<PersonId> = parents.iter().map(|&i| pick(&ids, i)).collect();
            graph
                .add_person(NewPerson::new(format!("Person {counter}"), scope.clone()), &parents)
                .map(|_| ())
        }
        Op::AddParent(a, b) => graph.add_parent_edge(&pick(&ids, *a), &pick(&ids, *b)),
        Op::RemoveParent(a, b) => graph.remove_parent_edge(&pick(&ids, *a), &pick(&ids, *b)),
        Op::AddPartner(a, b, kind) => graph.add_partner_edge(
            &pick(&ids, *a),
            &pick(&ids, *b),
            *kind,
            PartnerDates::default(),
        ),
        Op::RemovePartner(a, b) => graph.remove_partner_edge(&pick(&ids, *a), &pick(&ids, *b)),
        Op::Remove(a) => graph.remove_person(&pick(&ids, *a)),
    };
    result.is_ok()
}

/// Raw records with arbitrary edges: one-sided, cyclic, self-referencing, or
/// pointing at a person who does not exist (index `n`).
fn records_strategy() -> impl Strategy<Value = Vec<Person>> {
    (1usize..10).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec((0u8..3, 0..=n), 0..4), n).prop_map(
            move |edges| {
                edges
                    .into_iter()
                    .enumerate()
                    .map(|(i, list)| {
                        let mut person = Person::new(id(i), ScopeId::new("fam"), format!("P{i}"));
                        for (kind, target) in list {
                            let target = if target == n { PersonId::new("ghost") } else { id(target) };
                            match kind {
                                0 => person.parents.push(target),
                                1 => person.children.push(target),
                                _ => person.partners.push(PartnerEdge::new(
                                    target,
                                    RelationshipKind::Partners,
                                    PartnerDates::default(),
                                )),
                            }
                        }
                        person
                    })
                    .collect()
            },
        )
    })
}

fn id(i: usize) -> PersonId {
    PersonId::new(format!("p{i}"))
}

/// Whether either record of a distinct pair references the other.
fn adjacent(records: &[Person], a: usize, b: usize) -> bool {
    let refers = |from: &Person, to: &PersonId| from.neighbors().contains(to);
    a != b && (refers(&records[a], &records[b].id) || refers(&records[b], &records[a].id))
}

/// All-pairs hop counts by Floyd-Warshall.
fn distances(records: &[Person]) -> Vec<Vec<Option<usize>>> {
    let n = records.len();
    let mut dist = vec![vec![None; n]; n];
    for a in 0..n {
        dist[a][a] = Some(0);
        for b in 0..n {
            if adjacent(records, a, b) {
                dist[a][b] = Some(1);
            }
        }
    }
    for k in 0..n {
        for a in 0..n {
            for b in 0..n {
                if let (Some(x), Some(y)) = (dist[a][k], dist[k][b])
                    && dist[a][b].is_none_or(|d| x + y < d)
                {
                    dist[a][b] = Some(x + y);
                }
            }
        }
    }
    dist
}

proptest! {
    #[test]
    fn prop_tree_lists_each_person_once(records in records_strategy(), pick in any::<prop::sample::Index>()) {
        let snapshot = FamilySnapshot::new(ScopeId::new("fam"), records.clone());

        let tree = TreeBuilder::new(&snapshot).build(&[]).unwrap();
        let ids = tree.pre_order_ids();
        let unique: HashSet<&PersonId> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert!(!ids.is_empty());

        let root = records[pick.index(records.len())].id.clone();
        let rooted = TreeBuilder::new(&snapshot).build(std::slice::from_ref(&root)).unwrap();
        let ids = rooted.pre_order_ids();
        let unique: HashSet<&PersonId> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert_eq!(ids.first().copied(), Some(&root));
    }

    #[test]
    fn prop_path_has_minimum_hop_count(records in records_strategy()) {
        let snapshot = FamilySnapshot::new(ScopeId::new("fam"), records.clone());
        let finder = PathFinder::new(&snapshot);
        let dist = distances(&records);

        for a in 0..records.len() {
            for b in 0..records.len() {
                let path = finder.shortest_path(&records[a].id, &records[b].id);
                match dist[a][b] {
                    None => prop_assert!(path.is_empty(), "{} -> {} should be unreachable", a, b),
                    Some(hops) => {
                        prop_assert_eq!(path.len(), hops + 1);
                        prop_assert_eq!(path.first(), Some(&records[a].id));
                        prop_assert_eq!(path.last(), Some(&records[b].id));
                        prop_assert!(finder.describe(&path).is_some());
                    }
                }
            }
        }
    }

    #[test]
    fn prop_operations_preserve_consistency(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let scope = ScopeId::new("fam");
        let mut graph = RelationshipGraph::with_id_prefix(InMemoryPersonStore::new(), "fam");
        let mut counter = 0;

        for op in &ops {
            let before = graph.store().list_all().unwrap();
            let applied = apply(&mut graph, &scope, &mut counter, op);
            if !applied {
                prop_assert_eq!(&graph.store().list_all().unwrap(), &before, "rejected {:?} changed the store", op);
            }
            let violations = graph.check_consistency(&scope).unwrap();
            prop_assert!(violations.is_empty(), "{:?} left violations: {:?}", op, violations);
        }
    }

    #[test]
    fn prop_add_then_remove_parent_edge_restores_records(
        ops in prop::collection::vec(op_strategy(), 1..20),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let scope = ScopeId::new("fam");
        let mut graph = RelationshipGraph::with_id_prefix(InMemoryPersonStore::new(), "fam");
        let mut counter = 0;
        for op in &ops {
            apply(&mut graph, &scope, &mut counter, op);
        }

        let ids: Vec<PersonId> = graph.store().list_all().unwrap().into_iter().map(|p| p.id).collect();
        let (parent, child) = (pick(&ids, a), pick(&ids, b));
        let before = graph.store().list_all().unwrap();

        if graph.add_parent_edge(&parent, &child).is_ok() {
            graph.remove_parent_edge(&parent, &child).unwrap();
        }
        prop_assert_eq!(graph.store().list_all().unwrap(), before);
    }

    #[test]
    fn prop_add_then_remove_partner_edge_restores_records(
        ops in prop::collection::vec(op_strategy(), 1..20),
        a in any::<usize>(),
        b in any::<usize>(),
        kind in kind_strategy(),
    ) {
        let scope = ScopeId::new("fam");
        let mut graph = RelationshipGraph::with_id_prefix(InMemoryPersonStore::new(), "fam");
        let mut counter = 0;
        for op in &ops {
            apply(&mut graph, &scope, &mut counter, op);
        }

        let ids: Vec<PersonId> = graph.store().list_all().unwrap().into_iter().map(|p| p.id).collect();
        let (x, y) = (pick(&ids, a), pick(&ids, b));
        let before = graph.store().list_all().unwrap();

        if graph.add_partner_edge(&x, &y, kind, PartnerDates::default()).is_ok() {
            graph.remove_partner_edge(&x, &y).unwrap();
        }
        prop_assert_eq!(graph.store().list_all().unwrap(), before);
    }
}
