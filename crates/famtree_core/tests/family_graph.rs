use famtree_core::{
    ConnectivityExplorer, FamilyGraph, GraphError, MemberData, MemberId, UnionData, UnionId,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn graph_with(count: usize) -> (FamilyGraph, Vec<MemberId>) {
    let mut graph = FamilyGraph::new("test");
    let ids = (0..count)
        .map(|index| graph.add_member(MemberData::named(format!("m{index}"), "Doe")))
        .collect();
    (graph, ids)
}

#[test]
fn potential_children_exclude_the_whole_family() {
    let (mut graph, ids) = graph_with(4);
    let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);
    let union = graph
        .add_union(a, b, UnionData::default().with_child(c))
        .unwrap();

    let candidates = graph.potential_children(union).unwrap();
    assert_eq!(candidates, BTreeSet::from([d]));
}

#[test]
fn self_union_is_rejected_without_changes() {
    let (mut graph, ids) = graph_with(1);
    let before = graph.clone();

    assert_eq!(
        graph.add_union(ids[0], ids[0], UnionData::default()),
        Err(GraphError::SelfUnion(ids[0]))
    );
    assert_eq!(graph, before);
}

#[test]
fn duplicate_pair_is_rejected_in_either_order() {
    let (mut graph, ids) = graph_with(2);
    graph.add_union(ids[0], ids[1], UnionData::default()).unwrap();

    assert_eq!(
        graph.add_union(ids[1], ids[0], UnionData::formal()),
        Err(GraphError::DuplicateUnion(UnionId::new(ids[0], ids[1])))
    );
    assert_eq!(graph.union_count(), 1);
}

#[test]
fn unknown_partner_and_child_are_rejected() {
    let (mut graph, ids) = graph_with(2);
    let ghost = MemberId(99);

    assert_eq!(
        graph.add_union(ids[0], ghost, UnionData::default()),
        Err(GraphError::UnknownMember(ghost))
    );
    assert_eq!(
        graph.add_union(ids[0], ids[1], UnionData::default().with_child(ghost)),
        Err(GraphError::UnknownMember(ghost))
    );
    assert_eq!(
        graph.add_union(ids[0], ids[1], UnionData::default().with_child(ids[0])),
        Err(GraphError::ChildIsPartner(ids[0]))
    );
}

#[test]
fn adoption_requires_child_membership() {
    let (mut graph, ids) = graph_with(3);
    let mut data = UnionData::default();
    data.adoptions.insert(ids[2], None);

    assert_eq!(
        graph.add_union(ids[0], ids[1], data),
        Err(GraphError::AdoptionWithoutChild(ids[2]))
    );
}

#[test]
fn related_member_cannot_become_a_child() {
    let (mut graph, ids) = graph_with(4);
    let (grandma, grandpa, mother, father) = (ids[0], ids[1], ids[2], ids[3]);
    graph
        .add_union(grandma, grandpa, UnionData::default().with_child(mother))
        .unwrap();
    let couple = graph.add_union(mother, father, UnionData::default()).unwrap();

    let data = UnionData::default().with_child(grandma);
    assert_eq!(
        graph.update_union(couple, data),
        Err(GraphError::IneligibleChild(grandma))
    );
    assert!(graph.children_of(mother).is_empty());
}

#[test]
fn remove_member_cascades_to_unions() {
    let (mut graph, ids) = graph_with(5);
    let (a, b, c, d, e) = (ids[0], ids[1], ids[2], ids[3], ids[4]);
    let parents = graph
        .add_union(a, b, UnionData::default().with_adopted_child(c, None))
        .unwrap();
    let couple = graph.add_union(c, d, UnionData::default().with_child(e)).unwrap();

    let affected = graph.remove_member(c).unwrap();
    assert_eq!(affected, BTreeSet::from([parents, couple]));

    assert!(graph.member(c).is_none());
    assert!(graph.union(couple).is_none());
    let remaining = graph.union(parents).unwrap();
    assert!(!remaining.is_child(c));
    assert!(!remaining.is_adopted(c));
    assert!(!graph.has_parents(e));
    assert!(graph.unions().all(|union| !union.is_partner(c) && !union.is_child(c)));
}

#[test]
fn remove_unknown_member_fails() {
    let (mut graph, _) = graph_with(1);
    assert_eq!(
        graph.remove_member(MemberId(42)),
        Err(GraphError::MemberNotFound(MemberId(42)))
    );
}

#[test]
fn potential_partners_skip_members_in_unions() {
    let (mut graph, ids) = graph_with(4);
    graph.add_union(ids[0], ids[1], UnionData::default()).unwrap();

    assert_eq!(
        graph.potential_partners(Some(ids[2])),
        BTreeSet::from([ids[3]])
    );
    assert_eq!(graph.potential_partners(None), BTreeSet::from([ids[2], ids[3]]));
}

#[test]
fn explorer_walks_partner_and_child_edges() {
    let (mut graph, ids) = graph_with(6);
    graph
        .add_union(ids[0], ids[1], UnionData::default().with_child(ids[2]))
        .unwrap();
    graph
        .add_union(ids[2], ids[3], UnionData::default().with_child(ids[4]))
        .unwrap();

    let component = ConnectivityExplorer::new(&graph).explore(ids[4]);
    assert_eq!(component, ids[..5].iter().copied().collect::<BTreeSet<_>>());
    assert_eq!(
        ConnectivityExplorer::new(&graph).explore(ids[5]),
        BTreeSet::from([ids[5]])
    );
}

#[derive(Debug, Clone)]
enum Edit {
    Union { a: usize, b: usize, child: Option<usize> },
    Remove(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..8, 0usize..8, prop::option::of(0usize..8))
            .prop_map(|(a, b, child)| Edit::Union { a, b, child }),
        (0usize..8).prop_map(Edit::Remove),
    ]
}

proptest! {
    #[test]
    fn potential_children_are_never_related(edits in prop::collection::vec(edit(), 0..24)) {
        let (mut graph, ids) = graph_with(8);
        for edit in edits {
            match edit {
                Edit::Union { a, b, child } => {
                    let mut data = UnionData::default();
                    if let Some(child) = child {
                        data = data.with_child(ids[child]);
                    }
                    let _ = graph.add_union(ids[a], ids[b], data);
                }
                Edit::Remove(index) => {
                    let _ = graph.remove_member(ids[index]);
                }
            }
        }

        let explorer = ConnectivityExplorer::new(&graph);
        for union in graph.unions() {
            let candidates = graph.potential_children(union.id()).unwrap();
            let related = explorer.explore_from([union.partner1(), union.partner2()]);
            prop_assert!(candidates.is_disjoint(&related));
            prop_assert!(candidates.iter().all(|id| graph.member(*id).is_some()));
        }

        let before = graph.clone();
        let members: Vec<MemberId> = graph.members().map(|member| member.id()).collect();
        for member in members {
            prop_assert_eq!(
                graph.add_union(member, member, UnionData::default()),
                Err(GraphError::SelfUnion(member))
            );
        }
        prop_assert_eq!(graph, before);
    }

    #[test]
    fn removed_members_leave_no_references(
        edits in prop::collection::vec(edit(), 0..24),
        victim in 0usize..8,
    ) {
        let (mut graph, ids) = graph_with(8);
        for edit in edits {
            if let Edit::Union { a, b, child } = edit {
                let mut data = UnionData::default();
                if let Some(child) = child {
                    data = data.with_child(ids[child]);
                }
                let _ = graph.add_union(ids[a], ids[b], data);
            }
        }

        graph.remove_member(ids[victim]).unwrap();
        for union in graph.unions() {
            prop_assert!(!union.is_partner(ids[victim]));
            prop_assert!(!union.is_child(ids[victim]));
        }
    }
}
