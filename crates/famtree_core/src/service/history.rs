//! Bounded linear undo/redo history.
//!
//! # Responsibility
//! - Keep an ordered list of owned snapshots and a cursor into it.
//!
//! # Invariants
//! - Before the first push (and after `clear`) there is no current entry;
//!   both `undo` and `redo` fail.
//! - Pushing discards every redo-able entry beyond the cursor.
//! - At most `capacity` entries are kept; the oldest are dropped first.
//! - Entries are owned copies; later mutation of live state never changes
//!   a stored entry.

use crate::graph::FamilyGraph;
use crate::model::view::ViewState;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// History boundary conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    NothingToUndo,
    NothingToRedo,
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
        }
    }
}

impl Error for HistoryError {}

/// Immutable copy of one tree state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub graph: FamilyGraph,
    pub view: ViewState,
}

/// Linear undo/redo stack over owned entries.
#[derive(Debug, Clone)]
pub struct HistoryManager<T> {
    entries: VecDeque<T>,
    index: Option<usize>,
    capacity: usize,
}

impl<T> HistoryManager<T> {
    /// Creates an empty history keeping at most `capacity` entries
    /// (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: None,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry after the cursor and moves the cursor onto it.
    pub fn push_snapshot(&mut self, entry: T) {
        let keep = self.index.map_or(0, |index| index + 1);
        self.entries.truncate(keep);
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = Some(self.entries.len() - 1);
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.index.and_then(|index| self.entries.get(index))
    }

    /// Steps back and returns the entry now current.
    pub fn undo(&mut self) -> Result<&T, HistoryError> {
        match self.index {
            Some(index) if index > 0 => {
                self.index = Some(index - 1);
                Ok(&self.entries[index - 1])
            }
            _ => Err(HistoryError::NothingToUndo),
        }
    }

    /// Steps forward and returns the entry now current.
    pub fn redo(&mut self) -> Result<&T, HistoryError> {
        match self.index {
            Some(index) if index + 1 < self.entries.len() => {
                self.index = Some(index + 1);
                Ok(&self.entries[index + 1])
            }
            _ => Err(HistoryError::NothingToRedo),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|index| index > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.index.is_some_and(|index| index + 1 < self.entries.len())
    }

    /// Drops every entry; there is no current entry afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryError, HistoryManager};

    #[test]
    fn capacity_drops_oldest_entries() {
        let mut history = HistoryManager::new(3);
        for value in 0..5 {
            history.push_snapshot(value);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&4));
        assert_eq!(history.undo(), Ok(&3));
        assert_eq!(history.undo(), Ok(&2));
        assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut history = HistoryManager::new(0);
        history.push_snapshot("a");
        history.push_snapshot("b");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.current(), Some(&"b"));
        assert!(!history.can_undo());
    }

    #[test]
    fn push_after_undo_discards_redo_branch() {
        let mut history = HistoryManager::new(10);
        history.push_snapshot('a');
        history.push_snapshot('b');
        history.push_snapshot('c');
        history.undo().unwrap();
        history.undo().unwrap();
        history.push_snapshot('d');

        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Ok(&'a'));
        assert_eq!(history.redo(), Ok(&'d'));
    }
}
