//! Tree file schema versions and layout thresholds.
//!
//! # Responsibility
//! - Decode/encode the packed version integer stored in tree files.
//! - Name the versions at which the file layout changed.
//!
//! # Invariants
//! - Packed layout: `major << 16 | minor << 8 | patch`, bit 31 set for
//!   in-development builds.
//! - An in-development version sorts before the release with the same
//!   numbers.
//! - Thresholds remain in strictly increasing order.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// One tree file schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaVersion {
    major: u8,
    minor: u8,
    patch: u8,
    indev: bool,
}

/// Unions were stored as `weddings` with `spouse1`/`spouse2` before this
/// version; the `type`, `end_date`/`has_ended` and `adoptions` keys
/// appeared with it.
pub const RELATIONS_SINCE: SchemaVersion = SchemaVersion::new(1, 3, 0, true);

/// Card positions moved from each member into `canvas_state`, together
/// with card sizes, at this version.
pub const CANVAS_STATE_SINCE: SchemaVersion = SchemaVersion::new(1, 6, 0, true);

const CURRENT: SchemaVersion = SchemaVersion::new(1, 6, 0, false);

/// Returns the version written by this build.
pub fn current_version() -> SchemaVersion {
    CURRENT
}

impl SchemaVersion {
    pub const fn new(major: u8, minor: u8, patch: u8, indev: bool) -> Self {
        Self {
            major,
            minor,
            patch,
            indev,
        }
    }

    /// Decodes a packed version.
    pub fn from_raw(raw: u32) -> Self {
        Self {
            major: (raw >> 16) as u8,
            minor: (raw >> 8) as u8,
            patch: raw as u8,
            indev: raw >> 31 == 1,
        }
    }

    /// Encodes this version, in-development flag included.
    pub fn raw(&self) -> u32 {
        self.value() | (u32::from(self.indev) << 31)
    }

    pub fn is_indev(&self) -> bool {
        self.indev
    }

    fn value(&self) -> u32 {
        u32::from(self.major) << 16 | u32::from(self.minor) << 8 | u32::from(self.patch)
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value()
            .cmp(&other.value())
            .then_with(|| other.indev.cmp(&self.indev))
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dev = if self.indev { "d" } else { "" };
        if self.patch != 0 {
            write!(f, "{}.{}.{}{dev}", self.major, self.minor, self.patch)
        } else {
            write!(f, "{}.{}{dev}", self.major, self.minor)
        }
    }
}
