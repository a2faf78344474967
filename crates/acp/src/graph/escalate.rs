//! Escalate / retry / de-escalate.

use crate::error::AcpError;
use crate::param::context;

use super::{DependencyGraph, NodeId, SignPredicate};

impl DependencyGraph {
    /// Certified sign of `pred`, escalating its inputs as needed.
    ///
    /// Returns `AmbiguousAtMaxPrecision` when the configured maximum is
    /// reached without a decision; the graph is back at tier 0 either way.
    pub fn evaluate<P: SignPredicate + ?Sized>(&mut self, pred: &P) -> Result<i32, AcpError> {
        let roots = pred.dependencies();
        self.run_escalating(&roots, |g| pred.sign(g))
    }

    /// Promote `roots` and everything they depend on to the current ceiling,
    /// inputs first, recomputing each derived node once. Nodes already at
    /// the ceiling are skipped together with their inputs.
    pub fn increase_precision(&mut self, roots: &[NodeId]) -> Result<(), AcpError> {
        let ceiling = context::ceiling();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(NodeId, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();
        while let Some((id, inputs_done)) = stack.pop() {
            let i = id.0;
            if inputs_done {
                for p in self.nodes[i].parameters_mut() {
                    p.increase_precision();
                }
                tracing::trace!(node = %id, bits = ceiling, "recalculate");
                self.recalculate(i)?;
                continue;
            }
            if visited[i] {
                continue;
            }
            visited[i] = true;
            let current = self.nodes[i]
                .parameters()
                .first()
                .is_some_and(|p| p.bits() >= ceiling);
            if current {
                continue;
            }
            stack.push((id, true));
            for &d in self.nodes[i].dependencies().iter().rev() {
                if !visited[d.0] {
                    stack.push((d, false));
                }
            }
        }
        Ok(())
    }

    /// Collapse `roots` and everything they depend on back to tier 0. No
    /// recomputation: the exported double bounds stay valid enclosures.
    pub fn decrease_precision(&mut self, roots: &[NodeId]) {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            let node = &mut self.nodes[id.0];
            for p in node.parameters_mut() {
                p.decrease_precision();
            }
            stack.extend(node.dependencies().iter().filter(|d| !visited[d.0]));
        }
    }

    /// Run `attempt`; on `AmbiguousSign` raise the ceiling, escalate `roots`
    /// and retry until it decides or the maximum precision is exhausted.
    pub(crate) fn run_escalating<T>(
        &mut self,
        roots: &[NodeId],
        mut attempt: impl FnMut(&mut Self) -> Result<T, AcpError>,
    ) -> Result<T, AcpError> {
        debug_assert!(context::is_enabled(), "evaluation outside a session");
        self.stats.evaluations += 1;
        let base = context::ceiling();
        let mut rounds = 0u64;
        let result = loop {
            match attempt(self) {
                Err(AcpError::AmbiguousSign { .. }) => {}
                decided => break decided,
            }
            // Promotion can itself be ambiguous (a division at the new tier);
            // keep raising until it goes through.
            let escalated = loop {
                let Some(bits) = context::raise_ceiling() else {
                    break Err(AcpError::AmbiguousAtMaxPrecision {
                        bits: context::ceiling(),
                    });
                };
                rounds += 1;
                tracing::debug!(bits, roots = roots.len(), round = rounds, "escalating");
                match self.increase_precision(roots) {
                    Err(AcpError::AmbiguousSign { .. }) => continue,
                    other => break other,
                }
            };
            if let Err(e) = escalated {
                break Err(e);
            }
        };
        if rounds > 0 {
            self.stats.escalations += 1;
            self.stats.rounds += rounds;
            self.stats.max_bits = self.stats.max_bits.max(context::ceiling());
            self.decrease_precision(roots);
            context::restore_ceiling(base);
        }
        if let Err(AcpError::AmbiguousAtMaxPrecision { bits }) = &result {
            tracing::warn!(bits, roots = ?roots, "sign undecided at maximum precision");
        }
        result
    }
}
