//! Family tree domain model.
//!
//! # Responsibility
//! - Define the value types the graph, history and codec share.
//! - Keep field normalization next to the types it protects.
//!
//! # Invariants
//! - Members are identified by a graph-assigned `MemberId`.
//! - Unions are identified by their unordered partner pair.
//! - Dates are immutable `PartialDate` values, never shared mutably.

pub mod date;
pub mod member;
pub mod union;
pub mod view;
