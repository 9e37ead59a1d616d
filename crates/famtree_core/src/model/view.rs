//! Per-member view-state carried alongside the graph.
//!
//! The core never interprets these values; it stores them in snapshots and
//! persists them next to the members they belong to.

use crate::model::member::MemberId;
use std::collections::BTreeMap;

/// Card size in view units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardSize {
    pub w: u32,
    pub h: u32,
}

/// Position and optional size of one member card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CardState {
    pub x: i32,
    pub y: i32,
    /// Absent for trees saved before sizes were persisted.
    pub size: Option<CardSize>,
}

impl CardState {
    pub fn at(x: i32, y: i32) -> Self {
        Self { x, y, size: None }
    }

    pub fn with_size(mut self, w: u32, h: u32) -> Self {
        self.size = Some(CardSize { w, h });
        self
    }
}

/// View-state of every member card, keyed by member id.
pub type ViewState = BTreeMap<MemberId, CardState>;
