//! Node handles and the node/predicate traits.

use std::fmt;

use crate::error::AcpError;
use crate::param::Parameter;

use super::DependencyGraph;

/// Index of a node in its `DependencyGraph`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Boxed cloning for trait objects; implemented for every `Clone` node.
pub trait NodeClone {
    fn clone_node(&self) -> Box<dyn DependencyNode>;
}

impl<T: DependencyNode + Clone + 'static> NodeClone for T {
    fn clone_node(&self) -> Box<dyn DependencyNode> {
        Box::new(self.clone())
    }
}

/// A cached derived quantity: owned parameters computed from the parameters
/// of earlier nodes.
///
/// `calculate` must depend only on `upstream` and be repeatable at any tier;
/// escalation promotes the inputs and calls it again.
pub trait DependencyNode: NodeClone + fmt::Debug {
    fn dependencies(&self) -> &[NodeId];

    fn parameters(&self) -> &[Parameter];

    fn parameters_mut(&mut self) -> &mut [Parameter];

    /// Recompute the owned parameters. Input nodes (no dependencies) and pure
    /// structural nodes (no parameters) keep the default.
    fn calculate(&mut self, upstream: Upstream<'_>) -> Result<(), AcpError> {
        let _ = upstream;
        debug_assert!(
            self.dependencies().is_empty() || self.parameters().is_empty(),
            "derived node without a calculate()"
        );
        Ok(())
    }
}

/// Read access to a node's parameters by id.
pub trait ParameterSource {
    fn parameters(&self, id: NodeId) -> &[Parameter];

    #[inline]
    fn parameter(&self, id: NodeId, k: usize) -> &Parameter {
        &self.parameters(id)[k]
    }
}

/// The nodes that precede the one being calculated.
#[derive(Clone, Copy)]
pub struct Upstream<'a> {
    pub(crate) nodes: &'a [Box<dyn DependencyNode>],
}

impl<'a> ParameterSource for Upstream<'a> {
    #[inline]
    fn parameters(&self, id: NodeId) -> &[Parameter] {
        self.nodes[id.0].parameters()
    }
}

/// A sign test over graph nodes; the unit of escalation.
///
/// `sign` reads current values only and reports ambiguity as
/// `AcpError::AmbiguousSign`. Use `eval`/`holds` to get a certified answer.
pub trait SignPredicate {
    fn dependencies(&self) -> Vec<NodeId>;

    fn sign(&self, graph: &DependencyGraph) -> Result<i32, AcpError>;

    /// Certified sign, escalating as needed.
    fn eval(&self, graph: &mut DependencyGraph) -> Result<i32, AcpError> {
        graph.evaluate(self)
    }

    /// Certified `sign > 0`.
    fn holds(&self, graph: &mut DependencyGraph) -> Result<bool, AcpError> {
        Ok(self.eval(graph)? > 0)
    }
}

/// Counters over the lifetime of a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscalationStats {
    /// Escalation-protected runs (predicate evaluations and node inserts).
    pub evaluations: u64,
    /// Runs that needed at least one escalation round.
    pub escalations: u64,
    /// Total escalation rounds.
    pub rounds: u64,
    /// Highest ceiling reached.
    pub max_bits: u32,
}
