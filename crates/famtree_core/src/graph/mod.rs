//! In-memory family graph and its eligibility rules.
//!
//! # Responsibility
//! - Own the members and unions of one tree.
//! - Validate and apply member/union mutations atomically.
//! - Answer partner/child eligibility queries.
//!
//! # Invariants
//! - Every union partner and child references a present member.
//! - Member ids come from a monotonic counter and are never reused.
//! - At most one union exists per unordered partner pair.
//! - The adjacency index mirrors `unions` after every mutation.
//! - A failed mutation leaves the graph untouched.

pub mod explorer;

use crate::model::member::{Member, MemberData, MemberId};
use crate::model::union::{Union, UnionData, UnionId};
use explorer::ConnectivityExplorer;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by family graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Structural violations rejected by the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Referenced member does not exist.
    MemberNotFound(MemberId),
    /// Referenced union does not exist.
    UnionNotFound(UnionId),
    /// Both partners are the same member.
    SelfUnion(MemberId),
    /// A union already connects this pair.
    DuplicateUnion(UnionId),
    /// A partner or child id is not a member of this graph.
    UnknownMember(MemberId),
    /// A child id equals one of the partners.
    ChildIsPartner(MemberId),
    /// An adoption entry names a member outside the children set.
    AdoptionWithoutChild(MemberId),
    /// The child is already related to one of the partners.
    IneligibleChild(MemberId),
    /// Bulk-loaded data violates an identity rule.
    InvalidData(String),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::UnionNotFound(id) => write!(f, "union not found: {id}"),
            Self::SelfUnion(id) => write!(f, "member {id} cannot be in a union with itself"),
            Self::DuplicateUnion(id) => write!(f, "union already exists: {id}"),
            Self::UnknownMember(id) => write!(f, "unknown member: {id}"),
            Self::ChildIsPartner(id) => {
                write!(f, "member {id} cannot be a child of its own union")
            }
            Self::AdoptionWithoutChild(id) => {
                write!(f, "adopted member {id} is not a child of the union")
            }
            Self::IneligibleChild(id) => {
                write!(f, "member {id} is already related to the union partners")
            }
            Self::InvalidData(message) => write!(f, "invalid family data: {message}"),
        }
    }
}

impl Error for GraphError {}

/// Incident unions of one member.
#[derive(Debug, Clone, Default)]
struct MemberLinks {
    partner_in: BTreeSet<UnionId>,
    child_of: BTreeSet<UnionId>,
}

/// Members and unions of one family tree.
#[derive(Debug, Clone)]
pub struct FamilyGraph {
    name: String,
    next_id: u64,
    members: BTreeMap<MemberId, Member>,
    unions: BTreeMap<UnionId, Union>,
    links: BTreeMap<MemberId, MemberLinks>,
}

impl FamilyGraph {
    /// Creates an empty tree.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: 0,
            members: BTreeMap::new(),
            unions: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    /// Rebuilds a graph from persisted parts.
    ///
    /// Checks identity and reference rules but not child eligibility, so
    /// trees edited by older versions still load.
    ///
    /// # Errors
    /// - `InvalidData` for duplicate member ids or ids at/above `next_id`.
    /// - `SelfUnion`, `DuplicateUnion`, `UnknownMember`, `ChildIsPartner`,
    ///   `AdoptionWithoutChild` for malformed unions.
    pub fn from_parts(
        name: impl Into<String>,
        next_id: u64,
        members: impl IntoIterator<Item = (MemberId, MemberData)>,
        unions: impl IntoIterator<Item = (MemberId, MemberId, UnionData)>,
    ) -> GraphResult<Self> {
        let mut graph = Self::new(name);
        graph.next_id = next_id;

        for (id, data) in members {
            if id.0 >= next_id {
                return Err(GraphError::InvalidData(format!(
                    "member id {id} is not below the id counter {next_id}"
                )));
            }
            if graph.members.contains_key(&id) {
                return Err(GraphError::InvalidData(format!("duplicate member id {id}")));
            }
            graph.members.insert(id, Member::new(id, data));
            graph.links.insert(id, MemberLinks::default());
        }

        for (partner1, partner2, data) in unions {
            graph.check_new_pair(partner1, partner2)?;
            graph.check_children(partner1, partner2, &data)?;
            graph.attach(Union::new(partner1, partner2, data));
        }

        Ok(graph)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The id the next added member will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn union(&self, id: UnionId) -> Option<&Union> {
        self.unions.get(&id)
    }

    /// All members in id order.
    pub fn members(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members.values()
    }

    /// All unions in partner-pair order.
    pub fn unions(&self) -> impl Iterator<Item = &Union> + '_ {
        self.unions.values()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn union_count(&self) -> usize {
        self.unions.len()
    }

    /// Adds a member under the next free id.
    pub fn add_member(&mut self, data: MemberData) -> MemberId {
        let id = MemberId(self.next_id);
        self.next_id += 1;
        self.members.insert(id, Member::new(id, data));
        self.links.insert(id, MemberLinks::default());
        id
    }

    /// Replaces every mutable field of a member.
    pub fn update_member(&mut self, id: MemberId, data: MemberData) -> GraphResult<()> {
        let member = self
            .members
            .get_mut(&id)
            .ok_or(GraphError::MemberNotFound(id))?;
        member.replace_data(data);
        Ok(())
    }

    /// Removes a member and cascades to its unions.
    ///
    /// Unions where the member is a partner are deleted; unions where it is
    /// a child lose that child. Returns the ids of every affected union.
    pub fn remove_member(&mut self, id: MemberId) -> GraphResult<BTreeSet<UnionId>> {
        if !self.members.contains_key(&id) {
            return Err(GraphError::MemberNotFound(id));
        }
        let links = self.links.remove(&id).unwrap_or_default();

        for union_id in &links.partner_in {
            if let Some(union) = self.unions.remove(union_id) {
                self.detach(&union);
            }
        }
        for union_id in &links.child_of {
            if let Some(union) = self.unions.get_mut(union_id) {
                union.remove_child(id);
            }
        }
        self.members.remove(&id);

        Ok(links
            .partner_in
            .into_iter()
            .chain(links.child_of)
            .collect())
    }

    /// Creates a union between two distinct members.
    ///
    /// # Errors
    /// - `SelfUnion` when both partners are the same member.
    /// - `UnknownMember` when a partner or child is not in the graph.
    /// - `DuplicateUnion` when the pair already has a union.
    /// - `ChildIsPartner`, `AdoptionWithoutChild`, `IneligibleChild` for
    ///   invalid children.
    pub fn add_union(
        &mut self,
        partner1: MemberId,
        partner2: MemberId,
        data: UnionData,
    ) -> GraphResult<UnionId> {
        let union_id = self.check_new_pair(partner1, partner2)?;
        self.check_children(partner1, partner2, &data)?;
        self.check_eligibility(partner1, partner2, &data.children, &BTreeSet::new())?;
        self.attach(Union::new(partner1, partner2, data));
        Ok(union_id)
    }

    /// Replaces the data of an existing union; partners are kept.
    ///
    /// Children already in the union are accepted as-is; newly added
    /// children must pass the eligibility rule.
    pub fn update_union(&mut self, id: UnionId, data: UnionData) -> GraphResult<()> {
        let union = self.unions.get(&id).ok_or(GraphError::UnionNotFound(id))?;
        let (partner1, partner2) = (union.partner1(), union.partner2());
        let existing = union.children().clone();
        self.check_children(partner1, partner2, &data)?;
        self.check_eligibility(partner1, partner2, &data.children, &existing)?;

        for child in existing.difference(&data.children) {
            if let Some(links) = self.links.get_mut(child) {
                links.child_of.remove(&id);
            }
        }
        for child in data.children.difference(&existing) {
            if let Some(links) = self.links.get_mut(child) {
                links.child_of.insert(id);
            }
        }
        if let Some(union) = self.unions.get_mut(&id) {
            union.replace_data(data);
        }
        Ok(())
    }

    /// Removes a union and returns it.
    pub fn remove_union(&mut self, id: UnionId) -> GraphResult<Union> {
        let union = self
            .unions
            .remove(&id)
            .ok_or(GraphError::UnionNotFound(id))?;
        self.detach(&union);
        Ok(union)
    }

    /// Members that are not a partner in any union, minus `exclude`.
    pub fn potential_partners(&self, exclude: Option<MemberId>) -> BTreeSet<MemberId> {
        self.links
            .iter()
            .filter(|(id, links)| links.partner_in.is_empty() && Some(**id) != exclude)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Members that may be added as children of an existing union.
    ///
    /// Everyone already connected to either partner is excluded: they are
    /// an ancestor, descendant, sibling or in-law, and making them a child
    /// would close a relationship cycle.
    pub fn potential_children(&self, id: UnionId) -> GraphResult<BTreeSet<MemberId>> {
        let union = self.unions.get(&id).ok_or(GraphError::UnionNotFound(id))?;
        Ok(self.potential_children_for(union.partner1(), union.partner2()))
    }

    /// Same rule as `potential_children` for a couple without a union yet.
    pub fn potential_children_for(
        &self,
        partner1: MemberId,
        partner2: MemberId,
    ) -> BTreeSet<MemberId> {
        let related = ConnectivityExplorer::new(self).explore_from([partner1, partner2]);
        self.members
            .keys()
            .filter(|id| !related.contains(*id))
            .copied()
            .collect()
    }

    /// Returns whether a union connects `a` and `b`.
    pub fn are_in_union(&self, a: MemberId, b: MemberId) -> bool {
        self.unions.contains_key(&UnionId::new(a, b))
    }

    /// Returns whether the member is a child in some union.
    pub fn has_parents(&self, member: MemberId) -> bool {
        self.links
            .get(&member)
            .is_some_and(|links| !links.child_of.is_empty())
    }

    /// Unions where `member` is a partner.
    pub fn partner_unions(&self, member: MemberId) -> impl Iterator<Item = &Union> + '_ {
        self.linked_unions(member, |links| &links.partner_in)
    }

    /// Unions where `member` is a child.
    pub fn parent_unions(&self, member: MemberId) -> impl Iterator<Item = &Union> + '_ {
        self.linked_unions(member, |links| &links.child_of)
    }

    /// Children of `member` across all its unions.
    pub fn children_of(&self, member: MemberId) -> BTreeSet<MemberId> {
        self.partner_unions(member)
            .flat_map(|union| union.children().iter().copied())
            .collect()
    }

    fn linked_unions(
        &self,
        member: MemberId,
        select: fn(&MemberLinks) -> &BTreeSet<UnionId>,
    ) -> impl Iterator<Item = &Union> + '_ {
        self.links
            .get(&member)
            .map(select)
            .into_iter()
            .flatten()
            .filter_map(|id| self.unions.get(id))
    }

    fn check_new_pair(&self, partner1: MemberId, partner2: MemberId) -> GraphResult<UnionId> {
        if partner1 == partner2 {
            return Err(GraphError::SelfUnion(partner1));
        }
        for partner in [partner1, partner2] {
            if !self.members.contains_key(&partner) {
                return Err(GraphError::UnknownMember(partner));
            }
        }
        let union_id = UnionId::new(partner1, partner2);
        if self.unions.contains_key(&union_id) {
            return Err(GraphError::DuplicateUnion(union_id));
        }
        Ok(union_id)
    }

    fn check_children(
        &self,
        partner1: MemberId,
        partner2: MemberId,
        data: &UnionData,
    ) -> GraphResult<()> {
        for &child in &data.children {
            if child == partner1 || child == partner2 {
                return Err(GraphError::ChildIsPartner(child));
            }
            if !self.members.contains_key(&child) {
                return Err(GraphError::UnknownMember(child));
            }
        }
        if let Some(&adopted) = data
            .adoptions
            .keys()
            .find(|id| !data.children.contains(*id))
        {
            return Err(GraphError::AdoptionWithoutChild(adopted));
        }
        Ok(())
    }

    fn check_eligibility(
        &self,
        partner1: MemberId,
        partner2: MemberId,
        children: &BTreeSet<MemberId>,
        existing: &BTreeSet<MemberId>,
    ) -> GraphResult<()> {
        let mut added = children.difference(existing).peekable();
        if added.peek().is_none() {
            return Ok(());
        }
        let related = ConnectivityExplorer::new(self).explore_from([partner1, partner2]);
        match added.find(|child| related.contains(*child)) {
            Some(&child) => Err(GraphError::IneligibleChild(child)),
            None => Ok(()),
        }
    }

    fn attach(&mut self, union: Union) {
        let id = union.id();
        for partner in [union.partner1(), union.partner2()] {
            self.links.entry(partner).or_default().partner_in.insert(id);
        }
        for child in union.children() {
            self.links.entry(*child).or_default().child_of.insert(id);
        }
        self.unions.insert(id, union);
    }

    fn detach(&mut self, union: &Union) {
        let id = union.id();
        for partner in [union.partner1(), union.partner2()] {
            if let Some(links) = self.links.get_mut(&partner) {
                links.partner_in.remove(&id);
            }
        }
        for child in union.children() {
            if let Some(links) = self.links.get_mut(child) {
                links.child_of.remove(&id);
            }
        }
    }
}

impl PartialEq for FamilyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.next_id == other.next_id
            && self.unions == other.unions
            && self.members.len() == other.members.len()
            && self
                .members
                .values()
                .zip(other.members.values())
                .all(|(own, theirs)| own.same_record(theirs))
    }
}

impl Eq for FamilyGraph {}
