//! Dependency graph of derived quantities and the escalation protocol.
//!
//! Purpose
//! - Let geometric code state predicates as plain sign computations over
//!   cached nodes, and get certified answers back.
//!
//! Why this design
//! - Nodes live in an append-only arena and refer to their inputs by index.
//!   An input must already be in the arena, so the graph is acyclic by
//!   construction and `i < j` holds for every edge `j -> i`.
//! - Ambiguity is an ordinary `Err(AmbiguousSign)` value. A driver loop turns
//!   it into escalation rounds: raise the ceiling, promote and recompute the
//!   predicate's inputs bottom-up, retry; then collapse everything back to
//!   tier 0 and restore the ceiling, however many rounds ran.
//! - Promotion walks the graph iteratively in post-order with a visited set
//!   keyed by node index, so shared inputs are recomputed once per round.
//!
//! Invariant: outside `insert`/`evaluate` every parameter in the graph is at
//! tier 0.

mod escalate;
mod predicate;
mod types;

pub use types::{
    DependencyNode, EscalationStats, NodeClone, NodeId, ParameterSource, SignPredicate, Upstream,
};

use crate::error::AcpError;
use crate::param::Parameter;

/// Append-only arena of nodes.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<Box<dyn DependencyNode>>,
    stats: EscalationStats,
}

impl Clone for DependencyGraph {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.iter().map(|n| n.clone_node()).collect(),
            stats: self.stats,
        }
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&dyn DependencyNode> {
        self.nodes.get(id.0).map(|n| n.as_ref())
    }

    #[inline]
    pub fn stats(&self) -> EscalationStats {
        self.stats
    }

    /// Add a node and compute it. Its dependencies must already be in the
    /// graph. If the computation is sign-ambiguous (say, a near-singular
    /// division) it is escalated like a predicate; on failure the node is
    /// not added.
    pub fn insert<N: DependencyNode + 'static>(&mut self, node: N) -> Result<NodeId, AcpError> {
        self.push(Box::new(node))
    }

    /// Duplicate an existing node (same inputs, same cached values).
    pub fn copy_node(&mut self, id: NodeId) -> Result<NodeId, AcpError> {
        let node = self.checked(id)?.clone_node();
        self.nodes.push(node);
        Ok(NodeId(self.nodes.len() - 1))
    }

    fn push(&mut self, node: Box<dyn DependencyNode>) -> Result<NodeId, AcpError> {
        let len = self.nodes.len();
        if let Some(bad) = node.dependencies().iter().find(|d| d.0 >= len) {
            return Err(AcpError::UnknownNode { id: bad.0, len });
        }
        self.nodes.push(node);
        let id = NodeId(len);
        match self.run_escalating(&[id], |g| g.recalculate(len)) {
            Ok(()) => {
                tracing::trace!(node = %id, "inserted");
                Ok(id)
            }
            Err(e) => {
                self.nodes.pop();
                Err(e)
            }
        }
    }

    fn checked(&self, id: NodeId) -> Result<&dyn DependencyNode, AcpError> {
        self.get(id).ok_or(AcpError::UnknownNode {
            id: id.0,
            len: self.nodes.len(),
        })
    }

    /// Recompute node `i` from its (already current) inputs.
    fn recalculate(&mut self, i: usize) -> Result<(), AcpError> {
        let (before, rest) = self.nodes.split_at_mut(i);
        rest[0].calculate(Upstream { nodes: before })
    }
}

impl ParameterSource for DependencyGraph {
    /// Panics on an id that is not in the graph.
    #[inline]
    fn parameters(&self, id: NodeId) -> &[Parameter] {
        self.nodes[id.0].parameters()
    }
}
