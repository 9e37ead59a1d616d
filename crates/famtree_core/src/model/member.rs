//! Family member domain model.
//!
//! # Responsibility
//! - Define the person record stored by `FamilyGraph`.
//! - Normalize optional text and the dead flag on every write.
//!
//! # Invariants
//! - `id` is assigned by the owning graph and never reused.
//! - Equality and hashing use `id` only; `same_record` compares content.
//! - Optional text fields never hold an empty string.
//! - `dead` is `true` whenever a death date or death location is known.

use crate::model::date::{PartialDate, Period};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Stable member identifier, unique within one family graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl Display for MemberId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Member gender. Persisted as `"M"`, `"F"` or `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Gender {
    #[default]
    Unknown,
    Man,
    Woman,
}

impl Gender {
    /// Returns the persisted code.
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Unknown => "",
            Gender::Man => "M",
            Gender::Woman => "F",
        }
    }

    /// Parses a persisted code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "" => Some(Gender::Unknown),
            "M" => Some(Gender::Man),
            "F" => Some(Gender::Woman),
            _ => None,
        }
    }
}

/// Caller-supplied member fields, everything except the id.
///
/// Used as input for `FamilyGraph::add_member` and
/// `FamilyGraph::update_member`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberData {
    pub family_name: Option<String>,
    pub use_name: Option<String>,
    pub first_name: Option<String>,
    pub other_names: Option<String>,
    pub gender: Gender,
    pub birth_date: Option<PartialDate>,
    pub birth_location: Option<String>,
    pub death_date: Option<PartialDate>,
    pub death_location: Option<String>,
    pub dead: bool,
    pub comment: Option<String>,
    /// Opaque encoded image bytes.
    pub image: Option<Vec<u8>>,
}

impl MemberData {
    /// Convenience constructor for the common first/family name case.
    pub fn named(first_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            family_name: Some(family_name.into()),
            ..Self::default()
        }
    }

    /// Applies the storage normalization rules.
    pub(crate) fn normalized(mut self) -> Self {
        for field in [
            &mut self.family_name,
            &mut self.use_name,
            &mut self.first_name,
            &mut self.other_names,
            &mut self.birth_location,
            &mut self.death_location,
            &mut self.comment,
        ] {
            if field.as_deref() == Some("") {
                *field = None;
            }
        }
        if self.image.as_deref().is_some_and(<[u8]>::is_empty) {
            self.image = None;
        }
        if self.death_date.is_some() || self.death_location.is_some() {
            self.dead = true;
        }
        self
    }
}

/// A person node in the family graph.
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    data: MemberData,
}

impl Member {
    pub(crate) fn new(id: MemberId, data: MemberData) -> Self {
        Self {
            id,
            data: data.normalized(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    /// All mutable fields.
    pub fn data(&self) -> &MemberData {
        &self.data
    }

    pub(crate) fn replace_data(&mut self, data: MemberData) {
        self.data = data.normalized();
    }

    pub fn family_name(&self) -> Option<&str> {
        self.data.family_name.as_deref()
    }

    pub fn use_name(&self) -> Option<&str> {
        self.data.use_name.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.data.first_name.as_deref()
    }

    pub fn other_names(&self) -> Option<&str> {
        self.data.other_names.as_deref()
    }

    pub fn gender(&self) -> Gender {
        self.data.gender
    }

    pub fn birth_date(&self) -> Option<PartialDate> {
        self.data.birth_date
    }

    pub fn birth_location(&self) -> Option<&str> {
        self.data.birth_location.as_deref()
    }

    pub fn death_date(&self) -> Option<PartialDate> {
        self.data.death_date
    }

    pub fn death_location(&self) -> Option<&str> {
        self.data.death_location.as_deref()
    }

    pub fn is_dead(&self) -> bool {
        self.data.dead
    }

    pub fn comment(&self) -> Option<&str> {
        self.data.comment.as_deref()
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.data.image.as_deref()
    }

    /// Compares every field, id included.
    pub fn same_record(&self, other: &Member) -> bool {
        self.id == other.id && self.data == other.data
    }

    /// Age at death, or at `reference` for living members.
    ///
    /// Returns `None` when the birth date is unknown, when the member is
    /// dead without a known death date, or when the dates share no common
    /// granularity. Partial dates yield a coarser period.
    pub fn age(&self, reference: &PartialDate) -> Option<Period> {
        let birth = self.data.birth_date?;
        let end = if self.data.dead {
            self.data.death_date?
        } else {
            *reference
        };
        PartialDate::approximate_period(&birth, &end)
    }

    /// Compares birth dates, `None` when either is unknown.
    pub fn compare_birthdays(&self, other: &Member) -> Option<Ordering> {
        let own = self.data.birth_date?;
        let theirs = other.data.birth_date?;
        Some(own.cmp(&theirs))
    }

    /// `"first family"` with `?` placeholders, or `"?"` when both are unknown.
    pub fn display_name(&self) -> String {
        match (self.first_name(), self.family_name()) {
            (None, None) => "?".to_string(),
            (first, family) => format!("{} {}", first.unwrap_or("?"), family.unwrap_or("?")),
        }
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Member {}

impl Hash for Member {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
