//! Connected-component traversal over a family graph.
//!
//! # Responsibility
//! - Compute every member reachable from a start member through partner,
//!   parent-to-child and child-to-parent edges.
//!
//! # Invariants
//! - Each member is visited at most once; traversal terminates on any
//!   input, cyclic or not.
//! - The start member is always part of the result.

use crate::graph::FamilyGraph;
use crate::model::member::MemberId;
use std::collections::{BTreeSet, VecDeque};

/// Breadth-first explorer borrowing one graph.
pub struct ConnectivityExplorer<'graph> {
    graph: &'graph FamilyGraph,
}

impl<'graph> ConnectivityExplorer<'graph> {
    pub fn new(graph: &'graph FamilyGraph) -> Self {
        Self { graph }
    }

    /// Returns the connected component containing `start`.
    pub fn explore(&self, start: MemberId) -> BTreeSet<MemberId> {
        self.explore_from([start])
    }

    /// Returns the union of the components containing each start member.
    pub fn explore_from(&self, starts: impl IntoIterator<Item = MemberId>) -> BTreeSet<MemberId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        for start in starts {
            if visited.insert(start) {
                queue.push_back(start);
            }
        }

        while let Some(current) = queue.pop_front() {
            let partner_edges = self.graph.partner_unions(current).flat_map(|union| {
                union
                    .other_partner(current)
                    .into_iter()
                    .chain(union.children().iter().copied())
            });
            let parent_edges = self
                .graph
                .parent_unions(current)
                .flat_map(|union| [union.partner1(), union.partner2()]);

            for next in partner_edges.chain(parent_edges) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }
}
