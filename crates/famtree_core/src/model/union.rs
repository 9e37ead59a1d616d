//! Union (relationship) domain model.
//!
//! # Responsibility
//! - Define the pairwise relationship between two members and its children.
//!
//! # Invariants
//! - `partner1 != partner2`; partners never change after creation.
//! - A union is identified by its unordered partner pair (`UnionId`).
//! - No child equals a partner; adoption keys are a subset of children.
//! - A known end date implies `ended`.
//!
//! Child and partner invariants are enforced by `FamilyGraph`, which is the
//! only place unions are constructed.

use crate::model::date::PartialDate;
use crate::model::member::MemberId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Unordered partner pair identifying one union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnionId {
    low: MemberId,
    high: MemberId,
}

impl UnionId {
    /// Builds the id for a couple; argument order does not matter.
    pub fn new(a: MemberId, b: MemberId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Returns both partners, lowest id first.
    pub fn partners(&self) -> (MemberId, MemberId) {
        (self.low, self.high)
    }

    pub fn involves(&self, member: MemberId) -> bool {
        self.low == member || self.high == member
    }
}

impl Display for UnionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

/// Caller-supplied union fields, everything except the partners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnionData {
    /// Formal marriage, persisted as `type = "wedding"`.
    pub is_formal_union: bool,
    pub date: Option<PartialDate>,
    pub location: Option<String>,
    pub end_date: Option<PartialDate>,
    /// Independent of `end_date` except that a known end date forces it.
    pub ended: bool,
    pub children: BTreeSet<MemberId>,
    /// Adopted children with their optional adoption date.
    pub adoptions: BTreeMap<MemberId, Option<PartialDate>>,
}

impl UnionData {
    /// A formal union with no other data.
    pub fn formal() -> Self {
        Self {
            is_formal_union: true,
            ..Self::default()
        }
    }

    /// Adds a biological child.
    pub fn with_child(mut self, child: MemberId) -> Self {
        self.children.insert(child);
        self
    }

    /// Adds an adopted child with an optional adoption date.
    pub fn with_adopted_child(mut self, child: MemberId, date: Option<PartialDate>) -> Self {
        self.children.insert(child);
        self.adoptions.insert(child, date);
        self
    }

    pub(crate) fn normalized(mut self) -> Self {
        if self.location.as_deref() == Some("") {
            self.location = None;
        }
        if self.end_date.is_some() {
            self.ended = true;
        }
        self
    }
}

/// A relationship between two distinct members.
#[derive(Debug, Clone)]
pub struct Union {
    partner1: MemberId,
    partner2: MemberId,
    data: UnionData,
}

impl Union {
    pub(crate) fn new(partner1: MemberId, partner2: MemberId, data: UnionData) -> Self {
        Self {
            partner1,
            partner2,
            data: data.normalized(),
        }
    }

    pub fn id(&self) -> UnionId {
        UnionId::new(self.partner1, self.partner2)
    }

    pub fn partner1(&self) -> MemberId {
        self.partner1
    }

    pub fn partner2(&self) -> MemberId {
        self.partner2
    }

    pub fn is_partner(&self, member: MemberId) -> bool {
        self.partner1 == member || self.partner2 == member
    }

    /// Returns the partner opposite `member`, if `member` is a partner.
    pub fn other_partner(&self, member: MemberId) -> Option<MemberId> {
        if member == self.partner1 {
            Some(self.partner2)
        } else if member == self.partner2 {
            Some(self.partner1)
        } else {
            None
        }
    }

    pub fn data(&self) -> &UnionData {
        &self.data
    }

    pub fn is_formal_union(&self) -> bool {
        self.data.is_formal_union
    }

    pub fn date(&self) -> Option<PartialDate> {
        self.data.date
    }

    pub fn location(&self) -> Option<&str> {
        self.data.location.as_deref()
    }

    pub fn end_date(&self) -> Option<PartialDate> {
        self.data.end_date
    }

    pub fn has_ended(&self) -> bool {
        self.data.ended
    }

    pub fn children(&self) -> &BTreeSet<MemberId> {
        &self.data.children
    }

    pub fn is_child(&self, member: MemberId) -> bool {
        self.data.children.contains(&member)
    }

    pub fn is_adopted(&self, member: MemberId) -> bool {
        self.data.adoptions.contains_key(&member)
    }

    /// Adoption date of an adopted child; `None` when unknown or not adopted.
    pub fn adoption_date(&self, member: MemberId) -> Option<PartialDate> {
        self.data.adoptions.get(&member).copied().flatten()
    }

    pub(crate) fn replace_data(&mut self, data: UnionData) {
        self.data = data.normalized();
    }

    /// Removes a child and its adoption entry. Returns whether it was present.
    pub(crate) fn remove_child(&mut self, member: MemberId) -> bool {
        self.data.adoptions.remove(&member);
        self.data.children.remove(&member)
    }
}

impl PartialEq for Union {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.data == other.data
    }
}

impl Eq for Union {}

#[cfg(test)]
mod tests {
    use super::{Union, UnionData, UnionId};
    use crate::model::date::PartialDate;
    use crate::model::member::MemberId;

    #[test]
    fn union_id_is_order_independent() {
        assert_eq!(
            UnionId::new(MemberId(4), MemberId(1)),
            UnionId::new(MemberId(1), MemberId(4))
        );
        assert_eq!(
            UnionId::new(MemberId(4), MemberId(1)).partners(),
            (MemberId(1), MemberId(4))
        );
    }

    #[test]
    fn equality_is_symmetric_in_partners() {
        let data = UnionData::formal().with_child(MemberId(3));
        let a = Union::new(MemberId(1), MemberId(2), data.clone());
        let b = Union::new(MemberId(2), MemberId(1), data);
        assert_eq!(a, b);
        assert_eq!(b.partner1(), MemberId(2));
    }

    #[test]
    fn end_date_implies_ended() {
        let data = UnionData {
            end_date: Some(PartialDate::new(Some(1999), None, None).unwrap()),
            ..UnionData::default()
        };
        assert!(Union::new(MemberId(1), MemberId(2), data).has_ended());
    }

    #[test]
    fn remove_child_clears_adoption() {
        let date = PartialDate::ymd(2001, 9, 1).unwrap();
        let mut union = Union::new(
            MemberId(1),
            MemberId(2),
            UnionData::default().with_adopted_child(MemberId(3), Some(date)),
        );
        assert!(union.is_adopted(MemberId(3)));
        assert_eq!(union.adoption_date(MemberId(3)), Some(date));

        assert!(union.remove_child(MemberId(3)));
        assert!(!union.is_child(MemberId(3)));
        assert!(!union.is_adopted(MemberId(3)));
        assert!(!union.remove_child(MemberId(3)));
    }

    #[test]
    fn other_partner_resolves_both_sides() {
        let union = Union::new(MemberId(1), MemberId(2), UnionData::default());
        assert_eq!(union.other_partner(MemberId(1)), Some(MemberId(2)));
        assert_eq!(union.other_partner(MemberId(2)), Some(MemberId(1)));
        assert_eq!(union.other_partner(MemberId(3)), None);
    }
}
