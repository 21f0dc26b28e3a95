//! Normalization of weights into transition probabilities
use tracing::debug;

use crate::graph::{EdgeIndex, MetabolicGraph};
use crate::weighting::{prune_invalid_weights, WeightingPolicy, WeightingReport};

/// Rescale the outgoing weights of each vertex so they sum to 1
///
/// The graph then describes a Markov chain over its vertices. Unassigned weights count as 1,
/// and vertices whose outgoing weights sum to 0 (or to a non finite value) are left untouched
/// and counted in [`WeightingReport::skipped`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ProbabilityNormalization;

impl WeightingPolicy for ProbabilityNormalization {
    fn apply(&self, graph: &mut MetabolicGraph) -> WeightingReport {
        let mut report = WeightingReport {
            removed_invalid: prune_invalid_weights(graph),
            ..WeightingReport::default()
        };
        let nodes: Vec<_> = graph.node_indices().collect();
        for node in nodes {
            let outgoing: Vec<(EdgeIndex, f64)> = graph
                .out_edges(node)
                .iter()
                .map(|e| (e.id, e.edge.weight_or_default()))
                .collect();
            if outgoing.is_empty() {
                continue;
            }
            let total: f64 = outgoing.iter().map(|(_, w)| w).sum();
            if !(total.is_finite() && total > 0.0) {
                debug!("Outgoing weights of {} sum to {}", graph.id_of(node), total);
                report.skipped += 1;
                report.unassigned += outgoing.len();
                continue;
            }
            for (idx, w) in outgoing {
                if let Some(edge) = graph.edge_mut(idx) {
                    edge.weight = Some(w / total);
                    report.assigned += 1;
                }
            }
        }
        report
    }
}
