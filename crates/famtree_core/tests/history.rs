use famtree_core::{
    CardState, FamilyGraph, HistoryError, HistoryManager, MemberData, Snapshot, ViewState,
};

fn snapshot_named(name: &str) -> Snapshot {
    Snapshot {
        graph: FamilyGraph::new(name),
        view: ViewState::new(),
    }
}

#[test]
fn empty_history_has_nothing_to_undo_or_redo() {
    let mut history = HistoryManager::<Snapshot>::new(10);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
    assert_eq!(history.redo(), Err(HistoryError::NothingToRedo));
    assert!(history.current().is_none());
}

#[test]
fn single_entry_has_nothing_to_undo_or_redo() {
    let mut history = HistoryManager::new(10);
    history.push_snapshot(snapshot_named("a"));
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
}

#[test]
fn undo_then_redo_walks_between_snapshots() {
    let a = snapshot_named("a");
    let b = snapshot_named("b");
    let mut history = HistoryManager::new(10);
    history.push_snapshot(a.clone());
    history.push_snapshot(b.clone());

    assert_eq!(history.undo(), Ok(&a));
    assert!(history.can_redo());
    assert_eq!(history.redo(), Ok(&b));
    assert!(!history.can_redo());
}

#[test]
fn stored_snapshots_are_independent_of_live_state() {
    let mut graph = FamilyGraph::new("live");
    let mut view = ViewState::new();
    let mut history = HistoryManager::new(10);
    history.push_snapshot(Snapshot {
        graph: graph.clone(),
        view: view.clone(),
    });

    let id = graph.add_member(MemberData::named("Ada", "Lovelace"));
    view.insert(id, CardState::at(10, 20));

    let stored = history.current().unwrap();
    assert_eq!(stored.graph.member_count(), 0);
    assert!(stored.view.is_empty());
}

#[test]
fn clear_forgets_every_entry() {
    let mut history = HistoryManager::new(10);
    history.push_snapshot(snapshot_named("a"));
    history.push_snapshot(snapshot_named("b"));
    history.clear();

    assert!(history.is_empty());
    assert!(!history.can_undo());
    assert_eq!(history.redo(), Err(HistoryError::NothingToRedo));
}
