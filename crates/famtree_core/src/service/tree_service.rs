//! Family tree editing service.
//!
//! # Responsibility
//! - Own the live graph, its card view-state and the undo history.
//! - Route every edit through `FamilyGraph` validation and record a
//!   snapshot for each successful one.
//!
//! # Invariants
//! - The history's current entry always equals the live state.
//! - Failed edits change nothing and record nothing.
//! - Every card in the view-state belongs to an existing member.

use super::history::{HistoryError, HistoryManager, Snapshot};
use crate::codec::LoadedTree;
use crate::config::CoreConfig;
use crate::graph::{FamilyGraph, GraphError};
use crate::model::member::{MemberData, MemberId};
use crate::model::union::{Union, UnionData, UnionId};
use crate::model::view::{CardState, ViewState};
use log::debug;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from tree editing operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Graph(GraphError),
    History(HistoryError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graph(err) => write!(f, "{err}"),
            Self::History(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            Self::History(err) => Some(err),
        }
    }
}

impl From<GraphError> for ServiceError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<HistoryError> for ServiceError {
    fn from(value: HistoryError) -> Self {
        Self::History(value)
    }
}

/// Editing facade over one family tree.
#[derive(Debug, Clone)]
pub struct FamilyTreeService {
    graph: FamilyGraph,
    view: ViewState,
    history: HistoryManager<Snapshot>,
}

impl FamilyTreeService {
    /// Creates an empty tree; the empty state is the first history entry.
    pub fn new(name: impl Into<String>, config: &CoreConfig) -> Self {
        let mut service = Self {
            graph: FamilyGraph::new(name),
            view: ViewState::new(),
            history: HistoryManager::new(config.history.capacity),
        };
        service.record();
        service
    }

    /// Replaces the live state with a loaded tree and restarts history.
    pub fn open(&mut self, loaded: LoadedTree) {
        self.graph = loaded.graph;
        self.view = loaded.view;
        self.history.clear();
        self.record();
        debug!(
            "event=tree_open module=service status=ok members={} unions={}",
            self.graph.member_count(),
            self.graph.union_count()
        );
    }

    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn card(&self, member: MemberId) -> Option<&CardState> {
        self.view.get(&member)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.graph.set_name(name);
        self.record();
    }

    pub fn add_member(&mut self, data: MemberData) -> MemberId {
        let id = self.graph.add_member(data);
        self.record();
        debug!("event=member_add module=service status=ok member_id={id}");
        id
    }

    /// Adds a member together with its card.
    pub fn add_member_at(&mut self, data: MemberData, card: CardState) -> MemberId {
        let id = self.graph.add_member(data);
        self.view.insert(id, card);
        self.record();
        debug!("event=member_add module=service status=ok member_id={id}");
        id
    }

    pub fn update_member(&mut self, id: MemberId, data: MemberData) -> ServiceResult<()> {
        self.graph.update_member(id, data)?;
        self.record();
        debug!("event=member_update module=service status=ok member_id={id}");
        Ok(())
    }

    /// Removes a member, its card and every union it was a partner in.
    pub fn remove_member(&mut self, id: MemberId) -> ServiceResult<BTreeSet<UnionId>> {
        let removed = self.graph.remove_member(id)?;
        self.view.remove(&id);
        self.record();
        debug!(
            "event=member_remove module=service status=ok member_id={id} unions_removed={}",
            removed.len()
        );
        Ok(removed)
    }

    pub fn add_union(
        &mut self,
        partner1: MemberId,
        partner2: MemberId,
        data: UnionData,
    ) -> ServiceResult<UnionId> {
        let id = self.graph.add_union(partner1, partner2, data)?;
        self.record();
        debug!("event=union_add module=service status=ok union_id={id}");
        Ok(id)
    }

    pub fn update_union(&mut self, id: UnionId, data: UnionData) -> ServiceResult<()> {
        self.graph.update_union(id, data)?;
        self.record();
        debug!("event=union_update module=service status=ok union_id={id}");
        Ok(())
    }

    pub fn remove_union(&mut self, id: UnionId) -> ServiceResult<Union> {
        let removed = self.graph.remove_union(id)?;
        self.record();
        debug!("event=union_remove module=service status=ok union_id={id}");
        Ok(removed)
    }

    /// Places a member card.
    ///
    /// # Errors
    /// - `MemberNotFound` when `member` is not in the graph.
    pub fn move_card(&mut self, member: MemberId, card: CardState) -> ServiceResult<()> {
        if self.graph.member(member).is_none() {
            return Err(GraphError::MemberNotFound(member).into());
        }
        self.view.insert(member, card);
        self.record();
        Ok(())
    }

    /// Restores the previous state.
    pub fn undo(&mut self) -> ServiceResult<()> {
        let snapshot = self.history.undo()?;
        self.graph = snapshot.graph.clone();
        self.view = snapshot.view.clone();
        debug!("event=history_undo module=service status=ok");
        Ok(())
    }

    /// Re-applies the state undone last.
    pub fn redo(&mut self) -> ServiceResult<()> {
        let snapshot = self.history.redo()?;
        self.graph = snapshot.graph.clone();
        self.view = snapshot.view.clone();
        debug!("event=history_redo module=service status=ok");
        Ok(())
    }

    fn record(&mut self) {
        self.history.push_snapshot(Snapshot {
            graph: self.graph.clone(),
            view: self.view.clone(),
        });
    }
}
