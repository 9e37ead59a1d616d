//! Editing services above the graph model.
//!
//! # Responsibility
//! - Keep undo/redo history for tree edits.
//! - Expose one editing facade that owns live state and history together.

pub mod history;
pub mod tree_service;
